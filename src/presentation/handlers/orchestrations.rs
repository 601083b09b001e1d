use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::Value;

use crate::application::orchestration::OrchestrationError;
use crate::domain::{ActivityOutcome, HistoryEvent, InstanceId, OrchestrationRun};
use crate::presentation::state::AppState;

use super::error_response::error_response;

#[derive(Serialize)]
pub struct StartOrchestrationResponse {
    pub instance_id: String,
}

#[derive(Serialize)]
pub struct ActiveRunResponse {
    pub error: String,
    pub active_instance_id: String,
}

#[derive(Serialize)]
pub struct HistoryEntryResponse {
    pub sequence: u64,
    pub activity: String,
    pub attempts: u32,
    pub succeeded: bool,
    pub error: Option<String>,
    pub recorded_at: String,
}

#[derive(Serialize)]
pub struct OrchestrationStatusResponse {
    pub instance_id: String,
    pub pipeline: String,
    pub status: String,
    pub output: Option<Value>,
    pub error: Option<String>,
    pub history: Vec<HistoryEntryResponse>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&HistoryEvent> for HistoryEntryResponse {
    fn from(event: &HistoryEvent) -> Self {
        let error = match &event.outcome {
            ActivityOutcome::Succeeded(_) => None,
            ActivityOutcome::Failed(message) => Some(message.clone()),
        };
        Self {
            sequence: event.sequence,
            activity: event.activity_name.clone(),
            attempts: event.attempts,
            succeeded: event.outcome.is_succeeded(),
            error,
            recorded_at: event.recorded_at.to_rfc3339(),
        }
    }
}

impl From<OrchestrationRun> for OrchestrationStatusResponse {
    fn from(run: OrchestrationRun) -> Self {
        Self {
            instance_id: run.instance_id.to_string(),
            pipeline: run.pipeline,
            status: run.status.as_str().to_string(),
            history: run.history.iter().map(HistoryEntryResponse::from).collect(),
            output: run.output,
            error: run.error,
            created_at: run.created_at.to_rfc3339(),
            updated_at: run.updated_at.to_rfc3339(),
        }
    }
}

#[tracing::instrument(skip(state))]
pub async fn start_orchestration_handler(State(state): State<AppState>) -> Response {
    match state.orchestration_client.start_new().await {
        Ok(instance_id) => (
            StatusCode::ACCEPTED,
            Json(StartOrchestrationResponse {
                instance_id: instance_id.to_string(),
            }),
        )
            .into_response(),
        Err(OrchestrationError::AlreadyRunning { pipeline, active }) => (
            StatusCode::CONFLICT,
            Json(ActiveRunResponse {
                error: format!("Pipeline {} already has an active run", pipeline),
                active_instance_id: active,
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to start orchestration");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to start orchestration: {}", e),
            )
        }
    }
}

#[tracing::instrument(skip(state))]
pub async fn orchestration_status_handler(
    State(state): State<AppState>,
    Path(instance_id): Path<String>,
) -> Response {
    let id: InstanceId = match instance_id.parse() {
        Ok(id) => id,
        Err(_) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                format!("Invalid instance ID: {}", instance_id),
            );
        }
    };

    match state.orchestration_client.status(id).await {
        Ok(Some(run)) => {
            (StatusCode::OK, Json(OrchestrationStatusResponse::from(run))).into_response()
        }
        Ok(None) => error_response(
            StatusCode::NOT_FOUND,
            format!("Orchestration not found: {}", instance_id),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load orchestration");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to load orchestration: {}", e),
            )
        }
    }
}
