//! Scenario trait and supporting types
//!
//! The `Scenario` trait defines the interface for all scenario suites.
//! Each scenario can be configured via `ScenarioOptions` and returns a
//! `ScenarioResult` holding one `CaseResult` per case it ran.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};

use crate::client::MonitorClient;
use crate::fixtures::Fixtures;
use crate::verify::VerifyResult;

/// Errors that stop a scenario before it can report case results
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("Client error: {0}")]
    Client(#[from] crate::client::MonitorError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),
}

/// Outcome of one case within a scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseResult {
    /// Case description
    pub case: String,
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(with = "humantime_serde")]
    pub duration: Duration,
    /// Additional details (scenario-specific)
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub details: HashMap<String, serde_json::Value>,
}

impl CaseResult {
    pub fn passed(case: impl Into<String>, duration: Duration) -> Self {
        Self {
            case: case.into(),
            passed: true,
            error: None,
            duration,
            details: HashMap::new(),
        }
    }

    pub fn failed(case: impl Into<String>, duration: Duration, error: impl Into<String>) -> Self {
        Self {
            case: case.into(),
            passed: false,
            error: Some(error.into()),
            duration,
            details: HashMap::new(),
        }
    }

    /// Add a detail to the result
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.details.insert(key.into(), v);
        }
        self
    }
}

/// Overall result of a scenario run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    /// True when every case passed
    pub passed: bool,
    pub case_results: Vec<CaseResult>,
    #[serde(with = "humantime_serde")]
    pub duration: Duration,
    /// Summary message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ScenarioResult {
    pub fn new(
        scenario_name: impl Into<String>,
        case_results: Vec<CaseResult>,
        duration: Duration,
    ) -> Self {
        let passed = case_results.iter().all(|r| r.passed);
        Self {
            scenario_name: scenario_name.into(),
            passed,
            case_results,
            duration,
            message: None,
        }
    }

    /// Add a summary message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Mark the scenario failed with a reason that is not tied to a case
    pub fn failed_with(mut self, message: impl Into<String>) -> Self {
        self.passed = false;
        self.message = Some(message.into());
        self
    }

    pub fn failed_cases(&self) -> impl Iterator<Item = &CaseResult> {
        self.case_results.iter().filter(|c| !c.passed)
    }
}

/// Configuration options for a scenario
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScenarioOptions {
    /// Maximum time for the whole scenario
    #[serde(
        default,
        with = "humantime_serde",
        skip_serializing_if = "Option::is_none"
    )]
    pub timeout: Option<Duration>,

    /// Times the runner re-runs a scenario that did not pass
    #[serde(default)]
    pub retries: u32,

    /// Delay between re-runs
    #[serde(
        default,
        with = "humantime_serde",
        skip_serializing_if = "Option::is_none"
    )]
    pub retry_delay: Option<Duration>,

    /// Scenario-specific options (arbitrary key-value pairs)
    #[serde(default, flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl ScenarioOptions {
    /// Get the timeout or a default value
    pub fn timeout_or(&self, default: Duration) -> Duration {
        self.timeout.unwrap_or(default)
    }

    /// Get the retry delay or a default value
    pub fn retry_delay_or(&self, default: Duration) -> Duration {
        self.retry_delay.unwrap_or(default)
    }

    /// Get an extra option as a specific type
    pub fn get_extra<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Option<T> {
        self.extra
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }
}

/// Context provided to scenarios during execution
#[derive(Debug, Clone)]
pub struct ScenarioContext {
    /// Client for the system under test
    pub client: Arc<MonitorClient>,
    /// Run seed; each scenario derives its own fixture stream from it
    pub seed: u64,
}

impl ScenarioContext {
    pub fn new(client: MonitorClient, seed: u64) -> Self {
        Self {
            client: Arc::new(client),
            seed,
        }
    }

    /// Fixtures seeded from the run seed and the scenario name
    pub fn fixtures(&self, scenario: &str) -> Fixtures {
        Fixtures::new(scenario_seed(self.seed, scenario))
    }
}

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Run seed mixed with a 64-bit FNV-1a hash of the scenario name.
/// Must stay stable across releases so `--seed` replays the same payloads.
pub fn scenario_seed(seed: u64, scenario: &str) -> u64 {
    let hash = scenario
        .bytes()
        .fold(FNV_OFFSET, |h, b| (h ^ u64::from(b)).wrapping_mul(FNV_PRIME));
    seed ^ hash
}

/// Collects case results for one scenario
#[derive(Debug)]
pub struct CaseLog {
    scenario: &'static str,
    results: Vec<CaseResult>,
}

impl CaseLog {
    pub fn new(scenario: &'static str) -> Self {
        Self {
            scenario,
            results: Vec::new(),
        }
    }

    /// Run one case, recording pass or failure. Returns the case's value on success.
    pub async fn run<T, Fut>(&mut self, case: impl Into<String>, body: Fut) -> Option<T>
    where
        Fut: Future<Output = VerifyResult<T>>,
    {
        let case = case.into();
        let start = Instant::now();
        match body.await {
            Ok(value) => {
                debug!(scenario = self.scenario, case = %case, "Case passed");
                self.results.push(CaseResult::passed(case, start.elapsed()));
                Some(value)
            }
            Err(e) => {
                warn!(scenario = self.scenario, case = %case, error = %e, "Case failed");
                let result = CaseResult::failed(case, start.elapsed(), e.to_string());
                self.results.push(result);
                None
            }
        }
    }

    /// Record an outcome computed elsewhere
    pub fn push(&mut self, result: CaseResult) {
        self.results.push(result);
    }

    pub fn passed(&self) -> usize {
        self.results.iter().filter(|r| r.passed).count()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Close the log into a scenario result with a pass-count summary
    pub fn finish(self, start: Instant) -> ScenarioResult {
        let message = format!("{}/{} cases passed", self.passed(), self.len());
        ScenarioResult::new(self.scenario, self.results, start.elapsed()).with_message(message)
    }
}

/// Trait for implementing scenario suites
///
/// Each scenario is self-contained: it creates the entities it needs and
/// never relies on another scenario having run first.
///
/// ## Example Implementation
///
/// ```ignore
/// use async_trait::async_trait;
/// use cooper::scenarios::{
///     Scenario, ScenarioContext, ScenarioError, ScenarioOptions, ScenarioResult,
/// };
///
/// pub struct MyScenario;
///
/// #[async_trait]
/// impl Scenario for MyScenario {
///     fn name(&self) -> &'static str { "my-scenario" }
///     fn description(&self) -> &'static str { "Verifies something important" }
///
///     async fn run(
///         &self,
///         ctx: &ScenarioContext,
///         opts: &ScenarioOptions,
///     ) -> Result<ScenarioResult, ScenarioError> {
///         todo!()
///     }
/// }
/// ```
#[async_trait]
pub trait Scenario: Send + Sync {
    /// Unique name for this scenario (used in CLI and config)
    fn name(&self) -> &'static str;

    /// Human-readable description
    fn description(&self) -> &'static str;

    /// Run the scenario against the target
    async fn run(
        &self,
        ctx: &ScenarioContext,
        opts: &ScenarioOptions,
    ) -> Result<ScenarioResult, ScenarioError>;

    /// Default options for this scenario
    fn default_options(&self) -> ScenarioOptions {
        ScenarioOptions {
            timeout: Some(Duration::from_secs(120)),
            retries: 0,
            retry_delay: Some(Duration::from_secs(2)),
            extra: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verify::VerifyError;
    use serde_json::json;

    #[test]
    fn test_result_passes_only_when_all_cases_pass() {
        let ok = CaseResult::passed("a", Duration::ZERO);
        let bad = CaseResult::failed("b", Duration::ZERO, "boom");

        assert!(ScenarioResult::new("s", vec![ok.clone()], Duration::ZERO).passed);
        let result = ScenarioResult::new("s", vec![ok, bad], Duration::ZERO);
        assert!(!result.passed);
        assert_eq!(result.failed_cases().count(), 1);
    }

    #[test]
    fn test_failed_with_overrides_empty_pass() {
        let result = ScenarioResult::new("s", Vec::new(), Duration::ZERO);
        assert!(result.passed);
        let result = result.failed_with("Timeout after 1s");
        assert!(!result.passed);
        assert_eq!(result.message.as_deref(), Some("Timeout after 1s"));
    }

    #[test]
    fn test_get_extra() {
        let mut opts = ScenarioOptions::default();
        opts.extra.insert("parallel_requests".into(), json!(25));
        assert_eq!(opts.get_extra::<usize>("parallel_requests"), Some(25));
        assert_eq!(opts.get_extra::<usize>("missing"), None);
    }

    #[test]
    fn test_fixtures_differ_per_scenario() {
        let ctx = ScenarioContext::new(MonitorClient::new("http://localhost:1").unwrap(), 7);
        let a = ctx.fixtures("barrels").barrel();
        let b = ctx.fixtures("measurements").barrel();
        assert_ne!(a, b);
        assert_eq!(a, ctx.fixtures("barrels").barrel());
    }

    #[test]
    fn test_scenario_seed_is_pinned() {
        assert_eq!(scenario_seed(0, ""), FNV_OFFSET);
        assert_eq!(scenario_seed(0, "a"), 0xaf63_dc4c_8601_ec8c);
        assert_eq!(scenario_seed(1, "a"), 0xaf63_dc4c_8601_ec8d);
        assert_ne!(scenario_seed(7, "barrels"), scenario_seed(7, "measurements"));
    }

    #[test]
    fn test_monitor_errors_convert() {
        let err: ScenarioError = MonitorClient::new("not a url").unwrap_err().into();
        assert!(matches!(err, ScenarioError::Client(_)));
        assert!(err.to_string().starts_with("Client error:"));
    }

    #[tokio::test]
    async fn test_case_log_records_outcomes() {
        let mut log = CaseLog::new("demo");
        let value = log.run("works", async { Ok::<_, VerifyError>(5) }).await;
        let missing = log
            .run("breaks", async {
                Err::<(), _>(VerifyError::Assertion("nope".into()))
            })
            .await;

        assert_eq!(value, Some(5));
        assert_eq!(missing, None);

        let result = log.finish(Instant::now());
        assert!(!result.passed);
        assert_eq!(result.message.as_deref(), Some("1/2 cases passed"));
        assert_eq!(result.case_results[1].error.as_deref(), Some("nope"));
    }
}
