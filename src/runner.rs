//! Scenario runner
//!
//! Runs the selected scenarios as independent tokio tasks against one shared
//! [`ScenarioContext`]. A scenario that errors, times out or panics becomes a
//! failed [`ScenarioResult`] so every selected scenario shows up in the
//! summary. Scenarios that fail are re-run up to their `retries` option.

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use crate::api::ApiState;
use crate::config::Config;
use crate::scenarios::{
    SCENARIOS, Scenario, ScenarioContext, ScenarioError, ScenarioOptions, ScenarioResult,
};

/// Timeout applied when neither the scenario nor the config sets one
pub const DEFAULT_SCENARIO_TIMEOUT: Duration = Duration::from_secs(120);

/// Delay between re-runs when none is configured
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(2);

/// A scenario together with the options it runs with
#[derive(Clone)]
pub struct Planned {
    pub scenario: Arc<dyn Scenario>,
    pub options: ScenarioOptions,
}

impl std::fmt::Debug for Planned {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Planned")
            .field("scenario", &self.scenario.name())
            .field("options", &self.options)
            .finish()
    }
}

/// Resolve which scenarios to run and with what options
///
/// With a filter (comma-separated names) only those run, in registry order;
/// unknown names are skipped with a warning. Without one, every scenario the
/// config does not disable runs.
pub fn plan(config: &Config, filter: Option<&str>) -> Vec<Planned> {
    let wanted: Option<Vec<&str>> = filter.map(|f| {
        f.split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .collect()
    });

    if let Some(names) = &wanted {
        for name in names {
            if !SCENARIOS.contains_key(*name) {
                warn!(scenario = *name, "Unknown scenario, skipping");
            }
        }
    }

    SCENARIOS
        .iter()
        .filter(|(name, _)| match &wanted {
            Some(names) => names.contains(*name),
            None => config.is_scenario_enabled(name),
        })
        .map(|(name, scenario)| {
            let defaults = scenario.default_options();
            let options = config
                .scenario_config(name)
                .map(|c| c.to_scenario_options(&defaults))
                .unwrap_or(defaults);
            Planned {
                scenario: Arc::clone(scenario),
                options,
            }
        })
        .collect()
}

/// Outcome of a whole run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Target label from the config
    pub target: String,
    pub base_url: String,
    /// Seed every fixture stream of the run derives from
    pub seed: u64,
    /// True when every scenario passed
    pub passed: bool,
    #[serde(with = "humantime_serde")]
    pub duration: Duration,
    pub scenarios: Vec<ScenarioResult>,
}

impl RunSummary {
    pub fn failed_scenarios(&self) -> impl Iterator<Item = &ScenarioResult> {
        self.scenarios.iter().filter(|s| !s.passed)
    }

    /// (passed, total) over every case of every scenario
    pub fn case_counts(&self) -> (usize, usize) {
        self.scenarios.iter().fold((0, 0), |(passed, total), s| {
            let ok = s.case_results.iter().filter(|c| c.passed).count();
            (passed + ok, total + s.case_results.len())
        })
    }
}

/// Run one scenario with its timeout and retries
async fn run_one(
    scenario: Arc<dyn Scenario>,
    ctx: &ScenarioContext,
    opts: &ScenarioOptions,
) -> ScenarioResult {
    let name = scenario.name();
    let timeout = opts.timeout_or(DEFAULT_SCENARIO_TIMEOUT);
    let retry_delay = opts.retry_delay_or(DEFAULT_RETRY_DELAY);
    let max_attempts = opts.retries + 1;
    let start = Instant::now();

    let mut attempt = 1;
    loop {
        let result = match tokio::time::timeout(timeout, scenario.run(ctx, opts)).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => ScenarioResult::new(name, Vec::new(), start.elapsed())
                .failed_with(format!("Scenario error: {e}")),
            Err(_) => ScenarioResult::new(name, Vec::new(), start.elapsed())
                .failed_with(ScenarioError::Timeout(timeout).to_string()),
        };

        if result.passed || attempt >= max_attempts {
            return result;
        }

        debug!(
            scenario = name,
            attempt,
            delay_ms = retry_delay.as_millis(),
            "Scenario failed, will retry"
        );
        tokio::time::sleep(retry_delay).await;
        attempt += 1;
    }
}

/// Log a finished scenario the way the summary reads
fn log_result(result: &ScenarioResult) {
    if result.passed {
        info!(
            scenario = %result.scenario_name,
            duration_ms = result.duration.as_millis(),
            message = ?result.message,
            "Scenario PASSED"
        );
    } else {
        error!(
            scenario = %result.scenario_name,
            duration_ms = result.duration.as_millis(),
            message = ?result.message,
            failed_cases = result.failed_cases().count(),
            "Scenario FAILED"
        );
    }

    for case in &result.case_results {
        if case.passed {
            debug!(scenario = %result.scenario_name, case = %case.case, "Case passed");
        } else {
            warn!(
                scenario = %result.scenario_name,
                case = %case.case,
                error = ?case.error,
                "Case failed"
            );
        }
    }
}

/// Run every planned scenario in parallel and wait for all of them
pub async fn run(
    ctx: ScenarioContext,
    planned: Vec<Planned>,
    api_state: &ApiState,
) -> RunSummary {
    let start = Instant::now();
    let target = ctx.client.label();
    let base_url = ctx.client.base_url().to_string();
    let seed = ctx.seed;

    api_state.set_run_info(&target, seed);
    api_state.set_total_scenarios(planned.len());

    info!(
        count = planned.len(),
        scenarios = ?planned.iter().map(|p| p.scenario.name()).collect::<Vec<_>>(),
        seed,
        "Running scenarios in parallel"
    );

    let ctx = Arc::new(ctx);
    let mut pending = FuturesUnordered::new();
    for (index, Planned { scenario, options }) in planned.into_iter().enumerate() {
        let name = scenario.name();
        let ctx = Arc::clone(&ctx);
        let api_state = api_state.clone();

        let handle = tokio::spawn(async move {
            info!(scenario = name, "Starting scenario");
            api_state.start_scenario(name);
            run_one(scenario, &ctx, &options).await
        });
        pending.push(async move { (index, name, handle.await) });
    }

    // Recorded as they finish; the summary keeps plan order
    let mut results = Vec::with_capacity(pending.len());
    while let Some((index, name, joined)) = pending.next().await {
        let result = match joined {
            Ok(result) => result,
            Err(e) => {
                error!(scenario = name, error = %e, "Scenario task panicked");
                ScenarioResult::new(name, Vec::new(), start.elapsed())
                    .failed_with(format!("Scenario task panicked: {e}"))
            }
        };
        log_result(&result);
        api_state.record_result(result.clone());
        results.push((index, result));
    }
    results.sort_by_key(|(index, _)| *index);
    let results: Vec<ScenarioResult> = results.into_iter().map(|(_, result)| result).collect();

    let passed = results.iter().all(|r| r.passed);
    api_state.complete(passed);

    RunSummary {
        target,
        base_url,
        seed,
        passed,
        duration: start.elapsed(),
        scenarios: results,
    }
}
