use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::application::orchestration::{Orchestration, OrchestrationClient, TriggerOutcome};

/// Periodic trigger that starts a pipeline run on every tick unless one is
/// already active.
pub struct PipelineScheduler<O: Orchestration> {
    client: Arc<OrchestrationClient<O>>,
    interval: Duration,
    shutdown: watch::Receiver<bool>,
}

impl<O> PipelineScheduler<O>
where
    O: Orchestration + 'static,
    O::Output: 'static,
{
    pub fn new(
        client: Arc<OrchestrationClient<O>>,
        interval: Duration,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            client,
            interval,
            shutdown,
        }
    }

    pub async fn run(self) {
        tracing::info!(interval_ms = self.interval.as_millis(), "Pipeline scheduler started");

        let mut shutdown = self.shutdown.clone();
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => self.tick().await,
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::info!("Pipeline scheduler stopped");
    }

    async fn tick(&self) {
        match self.client.trigger().await {
            Ok(TriggerOutcome::Started(id)) => {
                tracing::debug!(instance_id = %id, "Tick started a run")
            }
            Ok(TriggerOutcome::Resumed(id)) => {
                tracing::debug!(instance_id = %id, "Tick resumed a run")
            }
            Ok(TriggerOutcome::Skipped(id)) => {
                tracing::debug!(instance_id = %id, "Tick skipped, run still active")
            }
            Err(e) => tracing::error!(error = %e, "Failed to trigger pipeline run"),
        }
    }
}
