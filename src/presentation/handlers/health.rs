use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;

use crate::presentation::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub pipeline: String,
    pub run_in_progress: bool,
    pub history_store: &'static str,
}

/// Ready while the history store answers; an in-progress run does not
/// affect readiness.
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let client = &state.orchestration_client;
    let (status_code, status, history_store) = match client.check_history_store().await {
        Ok(()) => (StatusCode::OK, "healthy", "reachable"),
        Err(e) => {
            tracing::warn!(error = %e, "History store health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "degraded", "unreachable")
        }
    };

    (
        status_code,
        Json(HealthResponse {
            status,
            pipeline: client.pipeline().to_string(),
            run_in_progress: !client.is_idle().await,
            history_store,
        }),
    )
}
