use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::application::services::SubmissionError;
use crate::presentation::state::AppState;

use super::error_response::error_response;

#[derive(Deserialize)]
pub struct SubmitRecordingRequest {
    pub name: String,
}

#[derive(Serialize)]
pub struct SubmitRecordingResponse {
    pub location: String,
}

#[tracing::instrument(skip(state, request))]
pub async fn submit_recording_handler(
    State(state): State<AppState>,
    Json(request): Json<SubmitRecordingRequest>,
) -> Response {
    let name = request.name.trim();
    if name.is_empty() || name.contains('/') {
        return error_response(StatusCode::BAD_REQUEST, "Recording name must be a blob name");
    }

    tracing::info!(recording = %name, "Submitting recording for transcription");

    match state.submission_service.submit(name).await {
        Ok(Some(location)) => (
            StatusCode::ACCEPTED,
            Json(SubmitRecordingResponse { location }),
        )
            .into_response(),
        Ok(None) => error_response(
            StatusCode::BAD_GATEWAY,
            "Transcription request not accepted",
        ),
        Err(SubmissionError::Signing(e)) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to sign recording url: {}", e),
        ),
        Err(SubmissionError::Service(e)) => error_response(
            StatusCode::BAD_GATEWAY,
            format!("Speech API request failed: {}", e),
        ),
    }
}
