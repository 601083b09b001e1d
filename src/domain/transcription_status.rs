use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lifecycle of a job on the remote transcription service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TranscriptionStatus {
    Submitted,
    Running,
    Succeeded,
    Failed,
}

impl TranscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TranscriptionStatus::Submitted => "NotStarted",
            TranscriptionStatus::Running => "Running",
            TranscriptionStatus::Succeeded => "Succeeded",
            TranscriptionStatus::Failed => "Failed",
        }
    }

    pub fn is_succeeded(&self) -> bool {
        matches!(self, TranscriptionStatus::Succeeded)
    }
}

impl FromStr for TranscriptionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "notstarted" | "submitted" => Ok(TranscriptionStatus::Submitted),
            "running" => Ok(TranscriptionStatus::Running),
            "succeeded" => Ok(TranscriptionStatus::Succeeded),
            "failed" => Ok(TranscriptionStatus::Failed),
            _ => Err(format!("Invalid transcription status: {}", s)),
        }
    }
}

impl TryFrom<String> for TranscriptionStatus {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<TranscriptionStatus> for String {
    fn from(status: TranscriptionStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for TranscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
