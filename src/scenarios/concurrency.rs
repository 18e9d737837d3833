//! Barrel Concurrency Scenario
//!
//! Fires a batch of independent `POST /barrels` requests at once and checks
//! that each one succeeds with 201 on its own. Completion order is not
//! checked.
//!
//! ## Options
//!
//! - `parallel_requests`: number of simultaneous creates (default: 10)

use async_trait::async_trait;
use std::time::Instant;
use tracing::info;

use super::common::{cleanup_barrels, create_barrel};
use super::traits::{
    CaseLog, CaseResult, Scenario, ScenarioContext, ScenarioError, ScenarioOptions, ScenarioResult,
};
use crate::client::NewBarrel;
use crate::fixtures::Fixtures;
use crate::utils::{FanOutOpts, Job, fan_out};

/// Default batch size
pub const DEFAULT_PARALLEL_REQUESTS: usize = 10;

/// Parallel create smoke test
pub struct BarrelConcurrencyScenario;

#[async_trait]
impl Scenario for BarrelConcurrencyScenario {
    fn name(&self) -> &'static str {
        "barrel-concurrency"
    }

    fn description(&self) -> &'static str {
        "Create barrels in parallel; every request must succeed independently"
    }

    async fn run(
        &self,
        ctx: &ScenarioContext,
        opts: &ScenarioOptions,
    ) -> Result<ScenarioResult, ScenarioError> {
        let start = Instant::now();
        let parallel: usize = opts
            .get_extra("parallel_requests")
            .unwrap_or(DEFAULT_PARALLEL_REQUESTS);
        if parallel == 0 {
            return Err(ScenarioError::Config(
                "parallel_requests must be at least 1".to_string(),
            ));
        }

        let mut fixtures = ctx.fixtures(self.name());
        info!(seed = fixtures.seed(), parallel, "Starting barrel concurrency scenario");

        // One generator per request so payloads do not depend on scheduling
        let jobs: Vec<Job<NewBarrel>> = (0..parallel)
            .map(|i| {
                let payload = Fixtures::new(fixtures.child_seed()).barrel();
                Job::new(format!("create-{i}"), payload)
            })
            .collect();

        let client = ctx.client.as_ref();
        let outcomes = fan_out(
            jobs,
            |payload| async move { create_barrel(client, &payload).await },
            &FanOutOpts::default().limit(parallel),
        )
        .await;

        let mut log = CaseLog::new(self.name());
        let mut created_ids = Vec::new();
        for outcome in outcomes {
            let case = format!("{} returns 201", outcome.id);
            match outcome.result {
                Ok(created) => {
                    log.push(
                        CaseResult::passed(case, outcome.elapsed)
                            .with_detail("barrel_id", &created.id),
                    );
                    created_ids.push(created.value.id);
                }
                Err(e) => log.push(CaseResult::failed(case, outcome.elapsed, e.to_string())),
            }
        }

        cleanup_barrels(client, &created_ids).await;

        let result = log.finish(start);
        info!(
            passed = result.passed,
            succeeded = created_ids.len(),
            requested = parallel,
            "Barrel concurrency scenario complete"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_batch_size() {
        assert_eq!(DEFAULT_PARALLEL_REQUESTS, 10);
        assert_eq!(BarrelConcurrencyScenario.name(), "barrel-concurrency");
    }
}
