//! Status HTTP API
//!
//! Optional HTTP server for following a run from outside the process,
//! e.g. a CI job polling until the suite is done.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check (always returns 200 if running)
//! - `GET /status` - Current execution status
//! - `GET /results` - Scenario results (202 until the run completes)
//! - `GET /metrics` - Prometheus text format

mod metrics;
mod server;
mod state;

pub use metrics::{metrics_handler, render as render_metrics};
pub use server::{create_router, start_api_server};
pub use state::{ApiState, ExecutionStatus, HealthResponse, ResultsResponse, StatusResponse};
