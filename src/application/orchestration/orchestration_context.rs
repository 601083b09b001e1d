use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::application::ports::HistoryStore;
use crate::domain::{ActivityOutcome, HistoryEvent, InstanceId, hash_input};

use super::activity_executor::ActivityExecutor;
use super::orchestration_error::OrchestrationError;

/// Failed outcome of an activity as observed by orchestration code.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{activity} failed: {message}")]
pub struct ActivityFailure {
    pub activity: String,
    pub message: String,
}

/// Counters describing how a run reached its current position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub replayed: usize,
    pub executed: usize,
    pub retries: u32,
    pub failed: usize,
}

/// Handle through which orchestration code performs all of its side effects.
///
/// Every `call_activity` is matched positionally against the recorded
/// history. A recorded outcome is returned as-is; past the end of the history
/// the activity is executed and its outcome persisted before it is returned.
pub struct OrchestrationContext {
    instance_id: InstanceId,
    history: Vec<HistoryEvent>,
    cursor: usize,
    executor: Arc<ActivityExecutor>,
    store: Arc<dyn HistoryStore>,
    stats: RunStats,
}

impl OrchestrationContext {
    pub fn new(
        instance_id: InstanceId,
        history: Vec<HistoryEvent>,
        executor: Arc<ActivityExecutor>,
        store: Arc<dyn HistoryStore>,
    ) -> Self {
        Self {
            instance_id,
            history,
            cursor: 0,
            executor,
            store,
            stats: RunStats::default(),
        }
    }

    pub fn instance_id(&self) -> InstanceId {
        self.instance_id
    }

    /// True while the next call will be served from recorded history.
    pub fn is_replaying(&self) -> bool {
        self.cursor < self.history.len()
    }

    pub fn stats(&self) -> RunStats {
        self.stats
    }

    pub(super) fn cursor(&self) -> usize {
        self.cursor
    }

    pub(super) fn history_len(&self) -> usize {
        self.history.len()
    }

    pub(super) fn recorded_name_at(&self, position: usize) -> Option<&str> {
        self.history
            .get(position)
            .map(|event| event.activity_name.as_str())
    }

    pub async fn call_activity<I, O>(
        &mut self,
        name: &str,
        input: &I,
    ) -> Result<Result<O, ActivityFailure>, OrchestrationError>
    where
        I: Serialize + ?Sized + Sync,
        O: DeserializeOwned,
    {
        let input = serde_json::to_value(input)?;
        let position = self.cursor as u64;

        let (outcome, attempts) = match self.history.get(self.cursor) {
            Some(recorded) => {
                verify_recorded(recorded, position, name, &input)?;
                tracing::debug!(
                    activity = name,
                    position,
                    "Replaying recorded activity outcome"
                );
                self.stats.replayed += 1;
                (recorded.outcome.clone(), recorded.attempts)
            }
            None => {
                let event = self.execute_live(position, name, input).await?;
                self.stats.executed += 1;
                let result = (event.outcome.clone(), event.attempts);
                self.history.push(event);
                result
            }
        };

        self.cursor += 1;
        self.stats.retries += attempts.saturating_sub(1);

        match outcome {
            ActivityOutcome::Succeeded(value) => Ok(Ok(serde_json::from_value(value)?)),
            ActivityOutcome::Failed(message) => {
                self.stats.failed += 1;
                Ok(Err(ActivityFailure {
                    activity: name.to_string(),
                    message,
                }))
            }
        }
    }

    async fn execute_live(
        &self,
        position: u64,
        name: &str,
        input: Value,
    ) -> Result<HistoryEvent, OrchestrationError> {
        let invocation = self.executor.execute(name, input).await;
        let event = HistoryEvent::new(
            position,
            invocation.name,
            invocation.input,
            invocation.outcome,
            invocation.attempts,
        );
        self.store.append(self.instance_id, &event).await?;
        Ok(event)
    }
}

fn verify_recorded(
    recorded: &HistoryEvent,
    position: u64,
    name: &str,
    input: &Value,
) -> Result<(), OrchestrationError> {
    let input_hash = hash_input(input);
    if recorded.activity_name != name || recorded.input_hash != input_hash {
        return Err(OrchestrationError::HistoryMismatch {
            position,
            recorded: format!("{}#{}", recorded.activity_name, short_hash(&recorded.input_hash)),
            called: format!("{}#{}", name, short_hash(&input_hash)),
        });
    }
    Ok(())
}

fn short_hash(hash: &str) -> &str {
    &hash[..hash.len().min(12)]
}
