use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::Instrument;

use crate::application::ports::HistoryStore;
use crate::domain::{InstanceId, OrchestrationRun, RunStatus};

use super::activity_executor::ActivityExecutor;
use super::orchestration_context::OrchestrationContext;
use super::orchestration_error::OrchestrationError;

/// Deterministic workflow code driven by the engine.
///
/// Implementations must derive every decision from their activity results:
/// no clocks, randomness or direct I/O. Given the same history they must
/// issue the same activity calls in the same order.
#[async_trait]
pub trait Orchestration: Send + Sync {
    type Output: Serialize + DeserializeOwned + Send;

    fn name(&self) -> &str;

    async fn run(&self, ctx: &mut OrchestrationContext)
    -> Result<Self::Output, OrchestrationError>;
}

pub struct OrchestrationEngine {
    store: Arc<dyn HistoryStore>,
    executor: Arc<ActivityExecutor>,
}

impl OrchestrationEngine {
    pub fn new(store: Arc<dyn HistoryStore>, executor: Arc<ActivityExecutor>) -> Self {
        Self { store, executor }
    }

    pub fn store(&self) -> Arc<dyn HistoryStore> {
        Arc::clone(&self.store)
    }

    /// Runs (or resumes) `instance_id` to completion.
    ///
    /// A completed run returns its stored output without executing anything.
    pub async fn run<O>(
        &self,
        orchestration: &O,
        instance_id: InstanceId,
    ) -> Result<O::Output, OrchestrationError>
    where
        O: Orchestration + ?Sized,
    {
        let span = tracing::info_span!(
            "orchestration",
            instance_id = %instance_id,
            pipeline = orchestration.name(),
        );

        self.run_inner(orchestration, instance_id)
            .instrument(span)
            .await
    }

    async fn run_inner<O>(
        &self,
        orchestration: &O,
        instance_id: InstanceId,
    ) -> Result<O::Output, OrchestrationError>
    where
        O: Orchestration + ?Sized,
    {
        let run = self.load_or_create(orchestration.name(), instance_id).await?;

        match run.status {
            RunStatus::Completed => {
                tracing::debug!("Run already completed, returning sealed output");
                let output = run.output.unwrap_or(serde_json::Value::Null);
                return Ok(serde_json::from_value(output)?);
            }
            RunStatus::Aborted => {
                return Err(OrchestrationError::RunAborted {
                    instance_id,
                    reason: run.error.unwrap_or_default(),
                });
            }
            RunStatus::Running => {}
        }

        let recorded = run.history.len();
        if recorded > 0 {
            tracing::info!(recorded, "Resuming run from recorded history");
        }

        let mut ctx = OrchestrationContext::new(
            instance_id,
            run.history,
            Arc::clone(&self.executor),
            Arc::clone(&self.store),
        );

        let result = match orchestration.run(&mut ctx).await {
            Ok(_) if ctx.cursor() < ctx.history_len() => Err(OrchestrationError::HistoryMismatch {
                position: ctx.cursor() as u64,
                recorded: ctx
                    .recorded_name_at(ctx.cursor())
                    .unwrap_or_default()
                    .to_string(),
                called: "<completion>".to_string(),
            }),
            other => other,
        };

        match result {
            Ok(output) => {
                let value = serde_json::to_value(&output)?;
                self.store.complete_run(instance_id, &value).await?;
                let stats = ctx.stats();
                tracing::info!(
                    replayed = stats.replayed,
                    executed = stats.executed,
                    "Run completed"
                );
                Ok(output)
            }
            Err(e) if e.is_fatal() => {
                tracing::error!(error = %e, "Run aborted on non-deterministic replay");
                if let Err(store_err) = self.store.abort_run(instance_id, &e.to_string()).await {
                    tracing::error!(error = %store_err, "Failed to mark run as aborted");
                }
                Err(e)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Run interrupted, left resumable");
                Err(e)
            }
        }
    }

    async fn load_or_create(
        &self,
        pipeline: &str,
        instance_id: InstanceId,
    ) -> Result<OrchestrationRun, OrchestrationError> {
        if let Some(run) = self.store.load_run(instance_id).await? {
            if run.pipeline != pipeline {
                return Err(OrchestrationError::PipelineMismatch {
                    instance_id,
                    recorded: run.pipeline,
                    requested: pipeline.to_string(),
                });
            }
            return Ok(run);
        }

        self.store.create_run(instance_id, pipeline).await?;
        Ok(OrchestrationRun::new(instance_id, pipeline))
    }
}
