//! Measurements Scenario
//!
//! Create, read and list measurements, plus the two rules that tie a
//! measurement to its barrel:
//!
//! - creating a measurement for an unknown barrel returns 404 "Barrel not found"
//! - deleting a barrel deletes its measurements (GET afterwards returns 404)
//!
//! Every case creates its own barrel so cases can fail independently.

use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Instant;
use tracing::info;

use super::common::{cleanup_barrels, create_barrel, create_measurement, ensure_listed};
use super::traits::{
    CaseLog, Scenario, ScenarioContext, ScenarioError, ScenarioOptions, ScenarioResult,
};
use crate::client::{MonitorClient, NewMeasurement};
use crate::fixtures::Fixtures;
use crate::schema::BARREL_NOT_FOUND_TITLE;
use crate::verify::{
    VerifyResult, ensure_eq, expect_measurement, expect_measurements, expect_problem,
    expect_status,
};

/// Measurement lifecycle scenario
pub struct MeasurementsScenario;

/// Create a fresh barrel and record its id for cleanup
async fn setup_barrel(
    client: &MonitorClient,
    fixtures: &mut Fixtures,
    created_ids: &mut Vec<String>,
) -> VerifyResult<String> {
    let barrel = create_barrel(client, &fixtures.barrel()).await?;
    created_ids.push(barrel.id.clone());
    Ok(barrel.value.id)
}

#[async_trait]
impl Scenario for MeasurementsScenario {
    fn name(&self) -> &'static str {
        "measurements"
    }

    fn description(&self) -> &'static str {
        "Create, fetch and list measurements; check barrel linkage and cascade delete"
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
        let mut created_ids: Vec<String> = Vec::new();

        info!(seed = fixtures.seed(), "Starting measurements scenario");

        log.run("create echoes fields and assigns an id", async {
            let barrel_id = setup_barrel(client, &mut fixtures, &mut created_ids).await?;
            create_measurement(client, &fixtures.measurement(barrel_id)).await?;
            VerifyResult::Ok(())
        })
        .await;

        log.run("zero readings are accepted", async {
            let barrel_id = setup_barrel(client, &mut fixtures, &mut created_ids).await?;
            let payload = NewMeasurement {
                id: None,
                barrel_id,
                dirt_level: 0.0,
                weight: 0.0,
            };
            create_measurement(client, &payload).await?;
            VerifyResult::Ok(())
        })
        .await;

        log.run("get by id equals the create response", async {
            let barrel_id = setup_barrel(client, &mut fixtures, &mut created_ids).await?;
            let created = create_measurement(client, &fixtures.measurement(barrel_id)).await?;
            let fetched = expect_measurement(
                &client.get_measurement(&created.id).await?,
                StatusCode::OK,
            )?;
            ensure_eq("fetched measurement", &created.raw, &fetched.raw)
        })
        .await;

        log.run("listing contains the created measurement", async {
            let barrel_id = setup_barrel(client, &mut fixtures, &mut created_ids).await?;
            let created = create_measurement(client, &fixtures.measurement(barrel_id)).await?;
            let listing = expect_measurements(&client.list_measurements().await?)?;
            ensure_listed(&listing.raw, &created.raw)
        })
        .await;

        let unknown = fixtures.missing_barrel_id();
        let orphan = fixtures.measurement(unknown);
        log.run("unknown barrel returns 404", async {
            let response = client.create_measurement(&orphan).await?;
            expect_problem(&response, StatusCode::NOT_FOUND, BARREL_NOT_FOUND_TITLE)?;
            VerifyResult::Ok(())
        })
        .await;

        log.run("deleting the barrel deletes its measurements", async {
            let barrel = create_barrel(client, &fixtures.barrel()).await?;
            let created = create_measurement(client, &fixtures.measurement(&barrel.id)).await?;
            expect_status(&client.delete_barrel(&barrel.id).await?, StatusCode::NO_CONTENT)?;
            expect_status(
                &client.get_measurement(&created.id).await?,
                StatusCode::NOT_FOUND,
            )
        })
        .await;

        cleanup_barrels(client, &created_ids).await;

        let result = log.finish(start);
        info!(
            passed = result.passed,
            duration_ms = result.duration.as_millis(),
            "Measurements scenario complete"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_metadata() {
        let scenario = MeasurementsScenario;
        assert_eq!(scenario.name(), "measurements");
        assert!(scenario.description().contains("cascade"));
    }
}
