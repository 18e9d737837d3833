//! Prometheus metrics
//!
//! Exposes run progress in Prometheus text format at `/metrics`.
//!
//! ## Metrics Exposed
//!
//! - `cooper_execution_status` - 0=running, 1=completed, 2=failed
//! - `cooper_scenarios_total` / `_completed` / `_passed` / `_failed`
//! - `cooper_elapsed_seconds` - Time since the run started
//! - `cooper_scenario_passed{scenario}` - 1 if the scenario passed
//! - `cooper_scenario_duration_seconds{scenario}`
//! - `cooper_scenario_cases_total{scenario}` / `cooper_scenario_cases_passed{scenario}`

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use std::fmt::{self, Write};

use super::state::ApiState;

const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

fn gauge(out: &mut String, name: &str, help: &str, value: impl fmt::Display) -> fmt::Result {
    writeln!(out, "# HELP {name} {help}")?;
    writeln!(out, "# TYPE {name} gauge")?;
    writeln!(out, "{name} {value}")?;
    writeln!(out)
}

fn labelled_gauge<V: fmt::Display>(
    out: &mut String,
    name: &str,
    help: &str,
    samples: impl IntoIterator<Item = (String, V)>,
) -> fmt::Result {
    writeln!(out, "# HELP {name} {help}")?;
    writeln!(out, "# TYPE {name} gauge")?;
    for (scenario, value) in samples {
        writeln!(out, "{name}{{scenario=\"{scenario}\"}} {value}")?;
    }
    writeln!(out)
}

/// Render the current state as Prometheus text
pub fn render(state: &ApiState) -> Result<String, fmt::Error> {
    let status = state.get_status_response();
    let results = state.get_results();
    let mut out = String::new();

    writeln!(out, "# HELP cooper_info Build information")?;
    writeln!(out, "# TYPE cooper_info gauge")?;
    writeln!(out, "cooper_info{{version=\"{}\"}} 1", env!("CARGO_PKG_VERSION"))?;
    writeln!(out)?;

    gauge(
        &mut out,
        "cooper_execution_status",
        "Current execution status (0=running, 1=completed, 2=failed)",
        status.status.as_gauge(),
    )?;
    gauge(
        &mut out,
        "cooper_scenarios_total",
        "Number of scenarios selected",
        status.scenarios_total,
    )?;
    gauge(
        &mut out,
        "cooper_scenarios_completed",
        "Number of scenarios completed",
        status.scenarios_completed,
    )?;
    gauge(
        &mut out,
        "cooper_scenarios_passed",
        "Number of scenarios that passed",
        status.scenarios_passed,
    )?;
    gauge(
        &mut out,
        "cooper_scenarios_failed",
        "Number of scenarios that failed",
        status.scenarios_failed,
    )?;
    gauge(
        &mut out,
        "cooper_elapsed_seconds",
        "Time elapsed since start",
        status.elapsed_ms as f64 / 1000.0,
    )?;

    if results.is_empty() {
        return Ok(out);
    }

    labelled_gauge(
        &mut out,
        "cooper_scenario_passed",
        "Whether a scenario passed (1) or failed (0)",
        results.iter().map(|r| (r.scenario_name.clone(), u8::from(r.passed))),
    )?;
    labelled_gauge(
        &mut out,
        "cooper_scenario_duration_seconds",
        "Duration of each scenario",
        results
            .iter()
            .map(|r| (r.scenario_name.clone(), r.duration.as_secs_f64())),
    )?;
    labelled_gauge(
        &mut out,
        "cooper_scenario_cases_passed",
        "Number of cases that passed in each scenario",
        results.iter().map(|r| {
            let passed = r.case_results.iter().filter(|c| c.passed).count();
            (r.scenario_name.clone(), passed)
        }),
    )?;
    labelled_gauge(
        &mut out,
        "cooper_scenario_cases_total",
        "Number of cases run by each scenario",
        results
            .iter()
            .map(|r| (r.scenario_name.clone(), r.case_results.len())),
    )?;

    Ok(out)
}

/// Generate Prometheus-format metrics
pub async fn metrics_handler(State(state): State<ApiState>) -> impl IntoResponse {
    match render(&state) {
        Ok(body) => (StatusCode::OK, [("content-type", CONTENT_TYPE)], body),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            [("content-type", CONTENT_TYPE)],
            String::new(),
        ),
    }
}
