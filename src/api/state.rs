//! API State management
//!
//! Shared state for the status API, tracking scenario execution progress.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

use crate::scenarios::ScenarioResult;

/// Execution status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    /// Scenarios are currently running
    Running,
    /// Every scenario passed
    Completed,
    /// At least one scenario failed or errored
    Failed,
}

impl ExecutionStatus {
    /// Numeric gauge value: 0=running, 1=completed, 2=failed
    pub fn as_gauge(self) -> u8 {
        match self {
            ExecutionStatus::Running => 0,
            ExecutionStatus::Completed => 1,
            ExecutionStatus::Failed => 2,
        }
    }
}

impl std::fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionStatus::Running => write!(f, "running"),
            ExecutionStatus::Completed => write!(f, "completed"),
            ExecutionStatus::Failed => write!(f, "failed"),
        }
    }
}

#[derive(Debug)]
struct InnerState {
    status: ExecutionStatus,
    target: Option<String>,
    seed: Option<u64>,
    started_at: Instant,
    completed_at: Option<Instant>,
    scenarios_total: usize,
    scenarios_passed: usize,
    scenarios_failed: usize,
    /// Scenarios started and not yet recorded
    running: Vec<String>,
    results: Vec<ScenarioResult>,
}

/// Shared API state
#[derive(Debug, Clone)]
pub struct ApiState {
    inner: Arc<RwLock<InnerState>>,
}

impl Default for ApiState {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiState {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(InnerState {
                status: ExecutionStatus::Running,
                target: None,
                seed: None,
                started_at: Instant::now(),
                completed_at: None,
                scenarios_total: 0,
                scenarios_passed: 0,
                scenarios_failed: 0,
                running: Vec::new(),
                results: Vec::new(),
            })),
        }
    }

    /// Record what the run is pointed at
    pub fn set_run_info(&self, target: impl Into<String>, seed: u64) {
        let mut state = self.inner.write();
        state.target = Some(target.into());
        state.seed = Some(seed);
    }

    pub fn set_total_scenarios(&self, total: usize) {
        self.inner.write().scenarios_total = total;
    }

    /// Mark a scenario as running
    pub fn start_scenario(&self, name: &str) {
        let mut state = self.inner.write();
        if !state.running.iter().any(|n| n == name) {
            state.running.push(name.to_string());
        }
    }

    /// Record a finished scenario
    pub fn record_result(&self, result: ScenarioResult) {
        let mut state = self.inner.write();
        if result.passed {
            state.scenarios_passed += 1;
        } else {
            state.scenarios_failed += 1;
        }
        state.running.retain(|n| *n != result.scenario_name);
        state.results.push(result);
    }

    /// Mark execution as complete
    pub fn complete(&self, success: bool) {
        let mut state = self.inner.write();
        state.status = if success {
            ExecutionStatus::Completed
        } else {
            ExecutionStatus::Failed
        };
        state.completed_at = Some(Instant::now());
        state.running.clear();
    }

    pub fn status(&self) -> ExecutionStatus {
        self.inner.read().status
    }

    /// Get status summary for API response
    pub fn get_status_response(&self) -> StatusResponse {
        let state = self.inner.read();
        StatusResponse {
            status: state.status,
            target: state.target.clone(),
            seed: state.seed,
            scenarios_total: state.scenarios_total,
            scenarios_completed: state.results.len(),
            scenarios_passed: state.scenarios_passed,
            scenarios_failed: state.scenarios_failed,
            running: state.running.clone(),
            elapsed_ms: state.started_at.elapsed().as_millis() as u64,
            duration_ms: state
                .completed_at
                .map(|t| t.duration_since(state.started_at).as_millis() as u64),
        }
    }

    pub fn get_results(&self) -> Vec<ScenarioResult> {
        self.inner.read().results.clone()
    }

    pub fn is_complete(&self) -> bool {
        self.inner.read().status != ExecutionStatus::Running
    }
}

/// Status API response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: ExecutionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub scenarios_total: usize,
    pub scenarios_completed: usize,
    pub scenarios_passed: usize,
    pub scenarios_failed: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub running: Vec<String>,
    pub elapsed_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

/// Health response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub healthy: bool,
    pub status: ExecutionStatus,
}

/// Results response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultsResponse {
    pub status: ExecutionStatus,
    pub results: Vec<ScenarioResult>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenarios::CaseResult;
    use std::time::Duration;

    fn result(name: &str, passed: bool) -> ScenarioResult {
        let case = if passed {
            CaseResult::passed("case", Duration::ZERO)
        } else {
            CaseResult::failed("case", Duration::ZERO, "boom")
        };
        ScenarioResult::new(name, vec![case], Duration::from_millis(5))
    }

    #[test]
    fn test_progress_counters() {
        let state = ApiState::new();
        state.set_total_scenarios(2);
        state.start_scenario("barrels");
        state.start_scenario("measurements");
        assert_eq!(state.get_status_response().running.len(), 2);

        state.record_result(result("barrels", true));
        state.record_result(result("measurements", false));

        let status = state.get_status_response();
        assert_eq!(status.scenarios_completed, 2);
        assert_eq!(status.scenarios_passed, 1);
        assert_eq!(status.scenarios_failed, 1);
        assert!(status.running.is_empty());
        assert!(!state.is_complete());
    }

    #[test]
    fn test_complete() {
        let state = ApiState::new();
        state.start_scenario("barrels");
        state.complete(false);

        assert!(state.is_complete());
        assert_eq!(state.status(), ExecutionStatus::Failed);
        let status = state.get_status_response();
        assert!(status.duration_ms.is_some());
        assert!(status.running.is_empty());
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(serde_json::to_value(ExecutionStatus::Running).unwrap(), "running");
        assert_eq!(ExecutionStatus::Failed.to_string(), "failed");
        assert_eq!(ExecutionStatus::Completed.as_gauge(), 1);
    }
}
