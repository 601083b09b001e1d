use std::sync::Arc;

use crate::application::ports::{
    ObjectStoreError, ObjectStoreGateway, TranscriptionService, TranscriptionServiceError,
};
use crate::domain::{BlobPath, Namespace, TranscriptionDefinition};

#[derive(Debug, Clone)]
pub struct SubmissionSettings {
    pub locale: String,
    pub description: String,
    pub policy_name: String,
}

/// Hands a newly uploaded recording to the transcription service.
pub struct RecordingSubmissionService {
    service: Arc<dyn TranscriptionService>,
    gateway: Arc<dyn ObjectStoreGateway>,
    settings: SubmissionSettings,
}

impl RecordingSubmissionService {
    pub fn new(
        service: Arc<dyn TranscriptionService>,
        gateway: Arc<dyn ObjectStoreGateway>,
        settings: SubmissionSettings,
    ) -> Self {
        Self {
            service,
            gateway,
            settings,
        }
    }

    /// Returns the created job's location, or `None` when the service did not
    /// accept the submission.
    #[tracing::instrument(skip(self))]
    pub async fn submit(&self, recording_name: &str) -> Result<Option<String>, SubmissionError> {
        let path = BlobPath::new(Namespace::Recordings, recording_name);
        let recording_url = self
            .gateway
            .sign_scoped_url(&path, &self.settings.policy_name)
            .await
            .map_err(SubmissionError::Signing)?;

        let definition = TranscriptionDefinition::new(
            recording_name,
            self.settings.description.clone(),
            self.settings.locale.clone(),
            recording_url,
        );

        match self.service.submit(&definition).await {
            Ok(Some(location)) => {
                tracing::info!(location = %location, "Transcript available at location");
                Ok(Some(location))
            }
            Ok(None) => {
                tracing::warn!("Transcription request not accepted");
                Ok(None)
            }
            Err(e) => {
                tracing::error!(error = %e, "Speech API request failed");
                Err(SubmissionError::Service(e))
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("signing recording url: {0}")]
    Signing(ObjectStoreError),
    #[error("transcription service: {0}")]
    Service(TranscriptionServiceError),
}
