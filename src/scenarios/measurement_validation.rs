//! Measurement Validation Scenario
//!
//! Probes `barrelId`, `dirtLevel` and `weight` with each state in
//! [`FieldState::ALL`], then sends a negative value for each numeric field.
//! Negative readings must be rejected with `"<Field> must be positive number"`.
//!
//! Bodies reference a real barrel so the only thing wrong with them is the
//! probed field. If that barrel cannot be created, a well-formed unknown id
//! is used instead; validation runs before the barrel lookup.

use async_trait::async_trait;
use serde_json::json;
use std::time::Instant;
use tracing::{info, warn};

use super::common::{FieldState, cleanup_barrels, create_barrel, expect_rejected, invalid_body};
use super::traits::{
    CaseLog, Scenario, ScenarioContext, ScenarioError, ScenarioOptions, ScenarioResult,
};
use crate::client::MonitorError;
use crate::schema::{ErrorField, MeasurementField};
use crate::verify::{VerifyResult, expect_validation_error};

/// Value sent by the negative-reading cases
const NEGATIVE_READING: f64 = -1.5;

/// Field validation on `POST /measurements`
pub struct MeasurementValidationScenario;

#[async_trait]
impl Scenario for MeasurementValidationScenario {
    fn name(&self) -> &'static str {
        "measurement-validation"
    }

    fn description(&self) -> &'static str {
        "Reject measurements with missing, mistyped or negative fields"
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

        info!(seed = fixtures.seed(), "Starting measurement validation scenario");

        let barrel = match create_barrel(client, &fixtures.barrel()).await {
            Ok(barrel) => Some(barrel.into_inner()),
            Err(e) => {
                warn!(error = %e, "Barrel setup failed, using an unknown barrel id");
                None
            }
        };
        let barrel_id = match &barrel {
            Some(barrel) => barrel.id.clone(),
            None => fixtures.missing_barrel_id(),
        };

        for &field in MeasurementField::all() {
            for state in FieldState::ALL {
                let valid = serde_json::to_value(fixtures.measurement(barrel_id.as_str()))
                    .map_err(MonitorError::Encode)?;
                let body = invalid_body(&valid, field, state);

                log.run(format!("{} {}", field.property(), state.label()), async {
                    let response = client.post_json("measurements", &body).await?;
                    expect_rejected(&response, field, state)
                })
                .await;
            }
        }

        for &field in MeasurementField::all() {
            let Some(message) = field.negative_message() else {
                continue;
            };
            let mut body = serde_json::to_value(fixtures.measurement(barrel_id.as_str()))
                .map_err(MonitorError::Encode)?;
            body[field.property()] = json!(NEGATIVE_READING);

            log.run(format!("{} negative", field.property()), async {
                let response = client.post_json("measurements", &body).await?;
                expect_validation_error(&response, field, message)?;
                VerifyResult::Ok(())
            })
            .await;
        }

        if let Some(barrel) = barrel {
            cleanup_barrels(client, &[barrel.id]).await;
        }

        let result = log.finish(start);
        info!(
            passed = result.passed,
            cases = result.case_results.len(),
            "Measurement validation scenario complete"
        );
        Ok(result)
    }
}
