use async_trait::async_trait;
use serde_json::Value;

use crate::domain::{HistoryEvent, InstanceId, OrchestrationRun};

/// Durable log of orchestration runs and the activity outcomes they recorded.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Registers a new running instance. Fails with `PipelineBusy` while
    /// another run of the same pipeline is still running.
    async fn create_run(&self, instance_id: InstanceId, pipeline: &str)
    -> Result<(), HistoryStoreError>;

    async fn load_run(&self, instance_id: InstanceId)
    -> Result<Option<OrchestrationRun>, HistoryStoreError>;

    /// Appends one event. The event's sequence must equal the current
    /// history length.
    async fn append(
        &self,
        instance_id: InstanceId,
        event: &HistoryEvent,
    ) -> Result<(), HistoryStoreError>;

    async fn complete_run(
        &self,
        instance_id: InstanceId,
        output: &Value,
    ) -> Result<(), HistoryStoreError>;

    async fn abort_run(&self, instance_id: InstanceId, reason: &str)
    -> Result<(), HistoryStoreError>;

    async fn list_running(&self) -> Result<Vec<OrchestrationRun>, HistoryStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum HistoryStoreError {
    #[error("connection failed: {0}")]
    ConnectionFailed(String),
    #[error("query failed: {0}")]
    QueryFailed(String),
    #[error("run not found: {0}")]
    NotFound(InstanceId),
    #[error("pipeline {pipeline} already has an active run {active}")]
    PipelineBusy { pipeline: String, active: String },
    #[error("history for {instance_id} is at position {expected}, cannot append {actual}")]
    SequenceConflict {
        instance_id: InstanceId,
        expected: u64,
        actual: u64,
    },
    #[error("run {0} is sealed")]
    Sealed(InstanceId),
}
