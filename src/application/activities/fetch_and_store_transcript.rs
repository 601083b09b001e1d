use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;

use crate::application::orchestration::{Activity, ActivityError, decode_input, encode_output};
use crate::application::ports::{ObjectStoreGateway, TranscriptionService};
use crate::domain::{BlobPath, TranscriptionJob};

use super::FETCH_AND_STORE_TRANSCRIPT;

/// Downloads every result channel of a job and stores them as one document.
///
/// Nothing is written unless all channels were retrieved.
pub struct FetchAndStoreTranscript {
    service: Arc<dyn TranscriptionService>,
    gateway: Arc<dyn ObjectStoreGateway>,
}

impl FetchAndStoreTranscript {
    pub fn new(service: Arc<dyn TranscriptionService>, gateway: Arc<dyn ObjectStoreGateway>) -> Self {
        Self { service, gateway }
    }
}

#[async_trait]
impl Activity for FetchAndStoreTranscript {
    fn name(&self) -> &'static str {
        FETCH_AND_STORE_TRANSCRIPT
    }

    async fn execute(&self, input: Value) -> Result<Value, ActivityError> {
        let job: TranscriptionJob = decode_input(input)?;

        if job.result_urls.is_empty() {
            return Err(ActivityError::Rejected(format!(
                "job {} has no result urls",
                job.id
            )));
        }

        tracing::info!(job_id = %job.id, channels = job.result_urls.len(), "Processing transcript");

        let mut channels = Vec::with_capacity(job.result_urls.len());
        for (channel, url) in &job.result_urls {
            let body = self.service.fetch_result(url).await?;
            let parsed: Value = serde_json::from_slice(&body).map_err(|e| {
                ActivityError::Rejected(format!("channel {} is not valid json: {}", channel, e))
            })?;
            channels.push(parsed);
        }

        let document = serde_json::to_vec(&channels)
            .map_err(|e| ActivityError::Rejected(format!("serialize transcript: {}", e)))?;

        let path = BlobPath::transcript(&job.id);
        let size = self.gateway.write(&path, Bytes::from(document)).await?;

        tracing::info!(job_id = %job.id, path = %path, bytes = size, "Transcript stored");

        encode_output(&path.to_string())
    }
}
