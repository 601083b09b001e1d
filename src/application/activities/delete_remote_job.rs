use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::application::orchestration::{Activity, ActivityError, decode_input, encode_output};
use crate::application::ports::{TranscriptionService, TranscriptionServiceError};
use crate::domain::TranscriptionJobId;

use super::DELETE_REMOTE_JOB;

/// Retires a remote job once its outputs are safely stored.
pub struct DeleteRemoteJob {
    service: Arc<dyn TranscriptionService>,
}

impl DeleteRemoteJob {
    pub fn new(service: Arc<dyn TranscriptionService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Activity for DeleteRemoteJob {
    fn name(&self) -> &'static str {
        DELETE_REMOTE_JOB
    }

    async fn execute(&self, input: Value) -> Result<Value, ActivityError> {
        let job_id: TranscriptionJobId = decode_input(input)?;

        tracing::info!(job_id = %job_id, "Deleting remote transcription");

        match self.service.delete_job(&job_id).await {
            Ok(true) => encode_output(&true),
            Ok(false) => Err(ActivityError::Rejected(format!(
                "service did not confirm deletion of {}",
                job_id
            ))),
            Err(TranscriptionServiceError::NotFound(_)) => {
                tracing::info!(job_id = %job_id, "Remote transcription already gone");
                encode_output(&true)
            }
            Err(e) => Err(e.into()),
        }
    }
}
