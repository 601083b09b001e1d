use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{HistoryEvent, InstanceId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Running,
    Completed,
    Aborted,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Running => "running",
            RunStatus::Completed => "completed",
            RunStatus::Aborted => "aborted",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, RunStatus::Running)
    }
}

impl FromStr for RunStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "running" => Ok(RunStatus::Running),
            "completed" => Ok(RunStatus::Completed),
            "aborted" => Ok(RunStatus::Aborted),
            _ => Err(format!("Invalid run status: {}", s)),
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One execution of a named pipeline together with everything it has recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestrationRun {
    pub instance_id: InstanceId,
    pub pipeline: String,
    pub status: RunStatus,
    pub history: Vec<HistoryEvent>,
    pub output: Option<Value>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrchestrationRun {
    pub fn new(instance_id: InstanceId, pipeline: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            instance_id,
            pipeline: pipeline.into(),
            status: RunStatus::Running,
            history: Vec::new(),
            output: None,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }
}
