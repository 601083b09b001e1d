use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::application::ports::{HistoryStore, HistoryStoreError};
use crate::domain::{HistoryEvent, InstanceId, OrchestrationRun, RunStatus};

const DEFAULT_RETENTION: usize = 1_000;

/// Process-local history store. Runs survive controller restarts within the
/// process but not a process restart.
///
/// Only the most recent `retention` finished runs are kept; older completed
/// or aborted runs are evicted when another run finishes. Running runs are
/// never evicted.
pub struct InMemoryHistoryStore {
    runs: RwLock<HashMap<InstanceId, OrchestrationRun>>,
    retention: usize,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::with_retention(DEFAULT_RETENTION)
    }

    pub fn with_retention(retention: usize) -> Self {
        Self {
            runs: RwLock::new(HashMap::new()),
            retention,
        }
    }

    fn evict_finished(&self) -> Result<(), HistoryStoreError> {
        let mut runs = self
            .runs
            .write()
            .map_err(|e| HistoryStoreError::QueryFailed(e.to_string()))?;
        let mut finished: Vec<(DateTime<Utc>, InstanceId)> = runs
            .values()
            .filter(|run| run.status.is_terminal())
            .map(|run| (run.updated_at, run.instance_id))
            .collect();
        if finished.len() <= self.retention {
            return Ok(());
        }
        finished.sort_by_key(|(updated_at, _)| *updated_at);
        let excess = finished.len() - self.retention;
        for (_, instance_id) in finished.into_iter().take(excess) {
            runs.remove(&instance_id);
        }
        tracing::debug!(evicted = excess, "Evicted finished runs from memory");
        Ok(())
    }

    fn update_run(
        &self,
        instance_id: InstanceId,
        apply: impl FnOnce(&mut OrchestrationRun),
    ) -> Result<(), HistoryStoreError> {
        let mut runs = self
            .runs
            .write()
            .map_err(|e| HistoryStoreError::QueryFailed(e.to_string()))?;
        let run = runs
            .get_mut(&instance_id)
            .ok_or(HistoryStoreError::NotFound(instance_id))?;
        if run.status.is_terminal() {
            return Err(HistoryStoreError::Sealed(instance_id));
        }
        apply(run);
        run.updated_at = Utc::now();
        Ok(())
    }
}

impl Default for InMemoryHistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn create_run(
        &self,
        instance_id: InstanceId,
        pipeline: &str,
    ) -> Result<(), HistoryStoreError> {
        let mut runs = self
            .runs
            .write()
            .map_err(|e| HistoryStoreError::QueryFailed(e.to_string()))?;

        if let Some(active) = runs
            .values()
            .find(|run| run.pipeline == pipeline && run.status == RunStatus::Running)
        {
            return Err(HistoryStoreError::PipelineBusy {
                pipeline: pipeline.to_string(),
                active: active.instance_id.to_string(),
            });
        }
        if runs.contains_key(&instance_id) {
            return Err(HistoryStoreError::QueryFailed(format!(
                "run {} already exists",
                instance_id
            )));
        }

        runs.insert(instance_id, OrchestrationRun::new(instance_id, pipeline));
        Ok(())
    }

    async fn load_run(
        &self,
        instance_id: InstanceId,
    ) -> Result<Option<OrchestrationRun>, HistoryStoreError> {
        let runs = self
            .runs
            .read()
            .map_err(|e| HistoryStoreError::QueryFailed(e.to_string()))?;
        Ok(runs.get(&instance_id).cloned())
    }

    async fn append(
        &self,
        instance_id: InstanceId,
        event: &HistoryEvent,
    ) -> Result<(), HistoryStoreError> {
        let mut conflict = None;
        self.update_run(instance_id, |run| {
            let expected = run.history.len() as u64;
            if event.sequence == expected {
                run.history.push(event.clone());
            } else {
                conflict = Some(expected);
            }
        })?;

        match conflict {
            Some(expected) => Err(HistoryStoreError::SequenceConflict {
                instance_id,
                expected,
                actual: event.sequence,
            }),
            None => Ok(()),
        }
    }

    async fn complete_run(
        &self,
        instance_id: InstanceId,
        output: &Value,
    ) -> Result<(), HistoryStoreError> {
        self.update_run(instance_id, |run| {
            run.status = RunStatus::Completed;
            run.output = Some(output.clone());
        })?;
        self.evict_finished()
    }

    async fn abort_run(
        &self,
        instance_id: InstanceId,
        reason: &str,
    ) -> Result<(), HistoryStoreError> {
        self.update_run(instance_id, |run| {
            run.status = RunStatus::Aborted;
            run.error = Some(reason.to_string());
        })?;
        self.evict_finished()
    }

    async fn list_running(&self) -> Result<Vec<OrchestrationRun>, HistoryStoreError> {
        let runs = self
            .runs
            .read()
            .map_err(|e| HistoryStoreError::QueryFailed(e.to_string()))?;
        let mut running: Vec<OrchestrationRun> = runs
            .values()
            .filter(|run| run.status == RunStatus::Running)
            .cloned()
            .collect();
        running.sort_by_key(|run| run.created_at);
        Ok(running)
    }
}
