use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::application::orchestration::{Activity, ActivityError, encode_output};
use crate::application::ports::TranscriptionService;
use crate::domain::TranscriptionJob;

use super::LIST_COMPLETE_JOBS;

/// Lists remote jobs and keeps the ones that have succeeded.
pub struct ListCompleteJobs {
    service: Arc<dyn TranscriptionService>,
}

impl ListCompleteJobs {
    pub fn new(service: Arc<dyn TranscriptionService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Activity for ListCompleteJobs {
    fn name(&self) -> &'static str {
        LIST_COMPLETE_JOBS
    }

    async fn execute(&self, _input: Value) -> Result<Value, ActivityError> {
        let jobs = self.service.list_jobs().await?;
        let listed = jobs.len();

        let complete: Vec<TranscriptionJob> = jobs
            .into_iter()
            .filter(|job| job.status.is_succeeded())
            .collect();

        tracing::info!(
            listed,
            ready = complete.len(),
            "Transcriptions ready to be processed"
        );

        encode_output(&complete)
    }
}
