//! HTTP Server for Status API
//!
//! Axum-based HTTP server providing status endpoints.

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::metrics::metrics_handler;
use super::state::{ApiState, ExecutionStatus, HealthResponse, ResultsResponse, StatusResponse};

/// Serve the status API on `0.0.0.0:port` until the task is dropped
pub async fn start_api_server(
    port: u16,
    state: ApiState,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;

    info!(port = port, "Starting status API server");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the API router
pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/status", get(status_handler))
        .route("/results", get(results_handler))
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Always 200 while the process is up; `status` tells whether the run is done
async fn health_handler(State(state): State<ApiState>) -> Json<HealthResponse> {
    let status = state.status();
    Json(HealthResponse {
        healthy: true,
        status,
    })
}

/// Progress counters and the scenarios still running
async fn status_handler(State(state): State<ApiState>) -> Json<StatusResponse> {
    Json(state.get_status_response())
}

/// Scenario results so far; 202 while the run is still going
async fn results_handler(State(state): State<ApiState>) -> (StatusCode, Json<ResultsResponse>) {
    let status = state.status();
    let results = state.get_results();

    let status_code = match status {
        ExecutionStatus::Running => StatusCode::ACCEPTED,
        ExecutionStatus::Completed | ExecutionStatus::Failed => StatusCode::OK,
    };

    (status_code, Json(ResultsResponse { status, results }))
}
