use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::application::ports::{ObjectStoreError, TranscriptionServiceError};

/// A named, retryable unit of side-effecting work.
///
/// Handlers may be invoked more than once with the same input (a retry after
/// a transient failure, or a crash before the outcome was recorded), so they
/// must tolerate re-execution.
#[async_trait]
pub trait Activity: Send + Sync {
    fn name(&self) -> &'static str;

    async fn execute(&self, input: Value) -> Result<Value, ActivityError>;
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ActivityError {
    #[error("transient: {0}")]
    Transient(String),
    #[error("rejected: {0}")]
    Rejected(String),
}

impl ActivityError {
    pub fn is_transient(&self) -> bool {
        matches!(self, ActivityError::Transient(_))
    }
}

impl From<TranscriptionServiceError> for ActivityError {
    fn from(e: TranscriptionServiceError) -> Self {
        if e.is_transient() {
            ActivityError::Transient(e.to_string())
        } else {
            ActivityError::Rejected(e.to_string())
        }
    }
}

impl From<ObjectStoreError> for ActivityError {
    fn from(e: ObjectStoreError) -> Self {
        match e {
            ObjectStoreError::NotFound(_) | ObjectStoreError::Configuration(_) => {
                ActivityError::Rejected(e.to_string())
            }
            _ => ActivityError::Transient(e.to_string()),
        }
    }
}

pub fn decode_input<T: DeserializeOwned>(input: Value) -> Result<T, ActivityError> {
    serde_json::from_value(input).map_err(|e| ActivityError::Rejected(format!("bad input: {}", e)))
}

pub fn encode_output<T: serde::Serialize>(output: &T) -> Result<Value, ActivityError> {
    serde_json::to_value(output)
        .map_err(|e| ActivityError::Rejected(format!("unserializable output: {}", e)))
}
