use std::sync::Arc;

use crate::application::orchestration::OrchestrationClient;
use crate::application::services::{RecordingSubmissionService, TranscriptionPipeline};

#[derive(Clone)]
pub struct AppState {
    pub orchestration_client: Arc<OrchestrationClient<TranscriptionPipeline>>,
    pub submission_service: Arc<RecordingSubmissionService>,
}
