use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::TranscriptionStatus;

/// Opaque identifier assigned by the remote transcription service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TranscriptionJobId(String);

impl TranscriptionJobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TranscriptionJobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A job as reported by the transcription service's listing endpoint.
///
/// `result_urls` maps a result channel name to the URL its transcript can be
/// downloaded from; the service only populates it once the job has succeeded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptionJob {
    pub id: TranscriptionJobId,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "recordingsUrl", alias = "recordingUrl")]
    pub recording_url: String,
    #[serde(default)]
    pub locale: String,
    pub status: TranscriptionStatus,
    #[serde(rename = "resultsUrls", alias = "resultUrls", default)]
    pub result_urls: BTreeMap<String, String>,
}

impl TranscriptionJob {
    /// True when the job has finished and its results can be downloaded.
    pub fn has_results(&self) -> bool {
        self.status.is_succeeded() && !self.result_urls.is_empty()
    }
}
