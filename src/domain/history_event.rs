use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Final result of one activity invocation, as recorded in a run's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ActivityOutcome {
    Succeeded(Value),
    Failed(String),
}

impl ActivityOutcome {
    pub fn is_succeeded(&self) -> bool {
        matches!(self, ActivityOutcome::Succeeded(_))
    }
}

/// One recorded activity call. `sequence` is the zero-based position of the
/// call within the run and is what replay matches against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEvent {
    pub sequence: u64,
    pub activity_name: String,
    pub input: Value,
    pub input_hash: String,
    pub outcome: ActivityOutcome,
    pub attempts: u32,
    pub recorded_at: DateTime<Utc>,
}

impl HistoryEvent {
    pub fn new(
        sequence: u64,
        activity_name: impl Into<String>,
        input: Value,
        outcome: ActivityOutcome,
        attempts: u32,
    ) -> Self {
        let input_hash = hash_input(&input);
        Self {
            sequence,
            activity_name: activity_name.into(),
            input,
            input_hash,
            outcome,
            attempts,
            recorded_at: Utc::now(),
        }
    }
}

/// Hex SHA-256 of the canonical JSON encoding of an activity input.
pub fn hash_input(input: &Value) -> String {
    let canonical = serde_json::to_string(input).unwrap_or_default();
    let digest = Sha256::digest(canonical.as_bytes());
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}
