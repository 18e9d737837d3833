//! Barrel Validation Scenario
//!
//! Probes every required barrel tag with each invalid state in
//! [`FieldState::ALL`]. Missing, null, undefined and empty values must yield
//! a 400 envelope whose `errors.<Field>[0]` is the fixed required message.
//! A value of the wrong JSON type must yield a `$.<field>` conversion error.

use async_trait::async_trait;
use std::time::Instant;
use tracing::info;

use super::common::{FieldState, expect_rejected, invalid_body};
use super::traits::{
    CaseLog, Scenario, ScenarioContext, ScenarioError, ScenarioOptions, ScenarioResult,
};
use crate::client::MonitorError;
use crate::schema::{BarrelField, ErrorField};

/// Required-field validation on `POST /barrels`
pub struct BarrelValidationScenario;

#[async_trait]
impl Scenario for BarrelValidationScenario {
    fn name(&self) -> &'static str {
        "barrel-validation"
    }

    fn description(&self) -> &'static str {
        "Reject barrels with missing, null, empty or mistyped tags"
    }

    async fn run(
        &self,
        ctx: &ScenarioContext,
        _opts: &ScenarioOptions,
    ) -> Result<ScenarioResult, ScenarioError> {
        let start = Instant::now();
        let client = ctx.client.as_ref();
        let mut fixtures = ctx.fixtures(self.name());
        let mut log = CaseLog::new(self.name());

        info!(seed = fixtures.seed(), "Starting barrel validation scenario");

        for &field in BarrelField::all() {
            for state in FieldState::ALL {
                let valid = serde_json::to_value(fixtures.barrel())
                    .map_err(MonitorError::Encode)?;
                let body = invalid_body(&valid, field, state);

                log.run(format!("{} {}", field.property(), state.label()), async {
                    let response = client.post_json("barrels", &body).await?;
                    expect_rejected(&response, field, state)
                })
                .await;
            }
        }

        let result = log.finish(start);
        info!(
            passed = result.passed,
            cases = result.case_results.len(),
            "Barrel validation scenario complete"
        );
        Ok(result)
    }
}
