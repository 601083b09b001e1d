use crate::application::ports::HistoryStoreError;
use crate::domain::InstanceId;

#[derive(Debug, thiserror::Error)]
pub enum OrchestrationError {
    #[error(
        "history mismatch at position {position}: recorded {recorded}, orchestration called {called}"
    )]
    HistoryMismatch {
        position: u64,
        recorded: String,
        called: String,
    },
    #[error("run {instance_id} belongs to pipeline {recorded}, not {requested}")]
    PipelineMismatch {
        instance_id: InstanceId,
        recorded: String,
        requested: String,
    },
    #[error("run {instance_id} was aborted: {reason}")]
    RunAborted {
        instance_id: InstanceId,
        reason: String,
    },
    #[error("pipeline {pipeline} already has an active run {active}")]
    AlreadyRunning { pipeline: String, active: String },
    #[error("history store: {0}")]
    History(#[from] HistoryStoreError),
    #[error("serialization: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl OrchestrationError {
    /// Determinism violations abort the run; anything else leaves it
    /// resumable.
    pub fn is_fatal(&self) -> bool {
        matches!(self, OrchestrationError::HistoryMismatch { .. })
    }
}
