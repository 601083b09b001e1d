use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::application::ports::{HistoryStore, HistoryStoreError};
use crate::domain::{InstanceId, OrchestrationRun};

use super::orchestration_engine::{Orchestration, OrchestrationEngine};
use super::orchestration_error::OrchestrationError;

/// What a trigger tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    Started(InstanceId),
    Resumed(InstanceId),
    Skipped(InstanceId),
}

/// Starts, resumes and inspects runs of one pipeline while keeping at most
/// one of them active.
pub struct OrchestrationClient<O: Orchestration> {
    engine: Arc<OrchestrationEngine>,
    store: Arc<dyn HistoryStore>,
    orchestration: Arc<O>,
    in_flight: Arc<Mutex<HashSet<InstanceId>>>,
}

impl<O> OrchestrationClient<O>
where
    O: Orchestration + 'static,
    O::Output: 'static,
{
    pub fn new(engine: Arc<OrchestrationEngine>, orchestration: Arc<O>) -> Self {
        Self {
            store: engine.store(),
            engine,
            orchestration,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    pub fn pipeline(&self) -> &str {
        self.orchestration.name()
    }

    /// Registers a new run and executes it in the background.
    ///
    /// Rejected with `AlreadyRunning` while another run of the pipeline is
    /// active.
    pub async fn start_new(&self) -> Result<InstanceId, OrchestrationError> {
        let instance_id = self.register_new().await?;
        tracing::info!(instance_id = %instance_id, "Started orchestration");
        self.spawn_run(instance_id).await;
        Ok(instance_id)
    }

    /// Registers a new run and drives it to completion on the caller's task.
    pub async fn run_new(&self) -> Result<O::Output, OrchestrationError> {
        let instance_id = self.register_new().await?;
        self.in_flight.lock().await.insert(instance_id);
        let result = self.engine.run(self.orchestration.as_ref(), instance_id).await;
        self.in_flight.lock().await.remove(&instance_id);
        result
    }

    /// Skip-if-running trigger: starts a run when the pipeline is idle,
    /// resumes an orphaned active run, and otherwise does nothing.
    pub async fn trigger(&self) -> Result<TriggerOutcome, OrchestrationError> {
        if let Some(active) = self.in_flight.lock().await.iter().next().copied() {
            return Ok(TriggerOutcome::Skipped(active));
        }

        match self.start_new().await {
            Ok(instance_id) => Ok(TriggerOutcome::Started(instance_id)),
            Err(OrchestrationError::AlreadyRunning { active, .. }) => {
                let instance_id: InstanceId = match active.parse() {
                    Ok(id) => id,
                    Err(_) => {
                        tracing::warn!(active = %active, "Active run has an unreadable id");
                        return Err(OrchestrationError::AlreadyRunning {
                            pipeline: self.pipeline().to_string(),
                            active,
                        });
                    }
                };
                if self.spawn_run(instance_id).await {
                    tracing::info!(instance_id = %instance_id, "Resuming orphaned run");
                    Ok(TriggerOutcome::Resumed(instance_id))
                } else {
                    Ok(TriggerOutcome::Skipped(instance_id))
                }
            }
            Err(e) => Err(e),
        }
    }

    /// Replays every run of this pipeline that was left running, e.g. by a
    /// process crash. Returns how many runs were resumed.
    pub async fn resume_incomplete(&self) -> Result<usize, OrchestrationError> {
        let pending: Vec<OrchestrationRun> = self
            .store
            .list_running()
            .await?
            .into_iter()
            .filter(|run| run.pipeline == self.pipeline())
            .collect();

        let mut resumed = 0;
        for run in pending {
            self.in_flight.lock().await.insert(run.instance_id);
            let result = self
                .engine
                .run(self.orchestration.as_ref(), run.instance_id)
                .await;
            self.in_flight.lock().await.remove(&run.instance_id);
            match result {
                Ok(_) => resumed += 1,
                Err(e) => {
                    tracing::error!(instance_id = %run.instance_id, error = %e, "Resume failed")
                }
            }
        }
        Ok(resumed)
    }

    pub async fn status(
        &self,
        instance_id: InstanceId,
    ) -> Result<Option<OrchestrationRun>, OrchestrationError> {
        Ok(self.store.load_run(instance_id).await?)
    }

    /// Round-trips a read through the history store.
    pub async fn check_history_store(&self) -> Result<(), OrchestrationError> {
        self.store.load_run(InstanceId::new()).await?;
        Ok(())
    }

    pub async fn is_idle(&self) -> bool {
        self.in_flight.lock().await.is_empty()
    }

    async fn register_new(&self) -> Result<InstanceId, OrchestrationError> {
        let instance_id = InstanceId::new();
        match self.store.create_run(instance_id, self.pipeline()).await {
            Ok(()) => Ok(instance_id),
            Err(HistoryStoreError::PipelineBusy { pipeline, active }) => {
                Err(OrchestrationError::AlreadyRunning { pipeline, active })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Returns `false` when the instance is already executing in this process.
    async fn spawn_run(&self, instance_id: InstanceId) -> bool {
        if !self.in_flight.lock().await.insert(instance_id) {
            return false;
        }

        let engine = Arc::clone(&self.engine);
        let orchestration = Arc::clone(&self.orchestration);
        let in_flight = Arc::clone(&self.in_flight);

        tokio::spawn(async move {
            if let Err(e) = engine.run(orchestration.as_ref(), instance_id).await {
                tracing::error!(instance_id = %instance_id, error = %e, "Orchestration failed");
            }
            in_flight.lock().await.remove(&instance_id);
        });
        true
    }
}
