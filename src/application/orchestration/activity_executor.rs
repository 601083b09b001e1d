use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::domain::ActivityOutcome;

use super::activity::{Activity, ActivityError};
use super::input_summary::summarize_input;
use super::retry_policy::RetryPolicy;

/// Result of driving one activity to a final outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityInvocation {
    pub name: String,
    pub input: Value,
    pub attempts: u32,
    pub outcome: ActivityOutcome,
}

/// Dispatches activity calls by name and retries transient failures.
pub struct ActivityExecutor {
    activities: HashMap<&'static str, Arc<dyn Activity>>,
    retry_policy: RetryPolicy,
}

impl ActivityExecutor {
    pub fn new(retry_policy: RetryPolicy) -> Self {
        Self {
            activities: HashMap::new(),
            retry_policy,
        }
    }

    pub fn register(mut self, activity: Arc<dyn Activity>) -> Self {
        self.activities.insert(activity.name(), activity);
        self
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.activities.contains_key(name)
    }

    pub async fn execute(&self, name: &str, input: Value) -> ActivityInvocation {
        let summary = summarize_input(&input);

        let Some(activity) = self.activities.get(name) else {
            tracing::error!(activity = name, "No handler registered for activity");
            return ActivityInvocation {
                name: name.to_string(),
                input,
                attempts: 0,
                outcome: ActivityOutcome::Failed(format!("no handler registered for {}", name)),
            };
        };

        let mut attempt = 1;
        loop {
            match activity.execute(input.clone()).await {
                Ok(output) => {
                    tracing::info!(
                        activity = name,
                        input = %summary,
                        attempt,
                        outcome = "succeeded",
                        "Activity completed"
                    );
                    return ActivityInvocation {
                        name: name.to_string(),
                        input,
                        attempts: attempt,
                        outcome: ActivityOutcome::Succeeded(output),
                    };
                }
                Err(e @ ActivityError::Transient(_)) if attempt < self.retry_policy.max_attempts => {
                    let delay = self.retry_policy.backoff_after(attempt);
                    tracing::warn!(
                        activity = name,
                        input = %summary,
                        attempt,
                        error = %e,
                        delay_ms = delay.as_millis(),
                        "Activity failed transiently, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    tracing::warn!(
                        activity = name,
                        input = %summary,
                        attempt,
                        outcome = "failed",
                        error = %e,
                        "Activity failed"
                    );
                    return ActivityInvocation {
                        name: name.to_string(),
                        input,
                        attempts: attempt,
                        outcome: ActivityOutcome::Failed(e.to_string()),
                    };
                }
            }
        }
    }
}
