use axum::Router;
use axum::middleware;
use axum::routing::{get, post};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::infrastructure::observability::request_id_middleware;
use crate::presentation::handlers::{
    health_handler, orchestration_status_handler, start_orchestration_handler,
    submit_recording_handler,
};
use crate::presentation::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/v1/orchestrations", post(start_orchestration_handler))
        .route(
            "/api/v1/orchestrations/{instance_id}",
            get(orchestration_status_handler),
        )
        .route("/api/v1/recordings", post(submit_recording_handler))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(trace_layer)
        .with_state(state)
}
