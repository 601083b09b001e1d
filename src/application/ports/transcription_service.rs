use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::{TranscriptionDefinition, TranscriptionJob, TranscriptionJobId};

#[async_trait]
pub trait TranscriptionService: Send + Sync {
    /// Submits a recording. `Ok(Some(location))` when the service accepted the
    /// job, `Ok(None)` when it answered with any other status.
    async fn submit(
        &self,
        definition: &TranscriptionDefinition,
    ) -> Result<Option<String>, TranscriptionServiceError>;

    async fn list_jobs(&self) -> Result<Vec<TranscriptionJob>, TranscriptionServiceError>;

    async fn fetch_result(&self, url: &str) -> Result<Bytes, TranscriptionServiceError>;

    /// Returns `true` when the service confirmed the deletion.
    async fn delete_job(&self, id: &TranscriptionJobId) -> Result<bool, TranscriptionServiceError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TranscriptionServiceError {
    #[error("request rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },
    #[error("resource not found: {0}")]
    NotFound(String),
    #[error("transient failure: {0}")]
    Transient(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl TranscriptionServiceError {
    /// Network failures, throttling and 5xx answers are worth retrying.
    pub fn is_transient(&self) -> bool {
        matches!(self, TranscriptionServiceError::Transient(_))
    }

    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            404 => TranscriptionServiceError::NotFound(message),
            408 | 429 | 500..=599 => {
                TranscriptionServiceError::Transient(format!("status {}: {}", status, message))
            }
            _ => TranscriptionServiceError::Rejected { status, message },
        }
    }
}
