//! Barrels Scenario
//!
//! Create, read, list and delete barrels.
//!
//! ## What it checks
//!
//! 1. POST /barrels returns 201 with the submitted tags and a non-empty id
//! 2. Single-character tags are accepted
//! 3. GET /barrels contains the new barrel, identical to the create response
//! 4. GET /barrels/{id} returns exactly the create response
//! 5. After DELETE (204), GET and a second DELETE return 404
//! 6. GET and DELETE of an id that was never issued return 404
//!
//! The service puts no upper bound on tag length. That is a known gap in the
//! service, so no case here asserts one.

use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Instant;
use tracing::info;

use super::common::{cleanup_barrels, create_barrel, ensure_listed};
use super::traits::{
    CaseLog, Scenario, ScenarioContext, ScenarioError, ScenarioOptions, ScenarioResult,
};
use crate::verify::{VerifyResult, ensure_eq, expect_barrel, expect_barrels, expect_status};

/// Barrel lifecycle scenario
pub struct BarrelsScenario;

#[async_trait]
impl Scenario for BarrelsScenario {
    fn name(&self) -> &'static str {
        "barrels"
    }

    fn description(&self) -> &'static str {
        "Create, fetch, list and delete barrels"
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

        info!(seed = fixtures.seed(), "Starting barrels scenario");

        let payload = fixtures.barrel();
        log.run("create echoes tags and assigns an id", async {
            let created = create_barrel(client, &payload).await?;
            created_ids.push(created.id.clone());
            VerifyResult::Ok(())
        })
        .await;

        let payload = fixtures.minimal_barrel();
        log.run("single-character tags are accepted", async {
            let created = create_barrel(client, &payload).await?;
            created_ids.push(created.id.clone());
            VerifyResult::Ok(())
        })
        .await;

        let payload = fixtures.example_barrel();
        log.run("listing contains the created barrel", async {
            let created = create_barrel(client, &payload).await?;
            created_ids.push(created.id.clone());
            let listing = expect_barrels(&client.list_barrels().await?)?;
            ensure_listed(&listing.raw, &created.raw)
        })
        .await;

        let payload = fixtures.barrel();
        log.run("get by id equals the create response", async {
            let created = create_barrel(client, &payload).await?;
            created_ids.push(created.id.clone());
            let fetched = expect_barrel(&client.get_barrel(&created.id).await?, StatusCode::OK)?;
            ensure_eq("fetched barrel", &created.raw, &fetched.raw)
        })
        .await;

        let payload = fixtures.barrel();
        log.run("deleted barrel is gone", async {
            let created = create_barrel(client, &payload).await?;
            expect_status(&client.delete_barrel(&created.id).await?, StatusCode::NO_CONTENT)?;
            expect_status(&client.get_barrel(&created.id).await?, StatusCode::NOT_FOUND)?;
            expect_status(&client.delete_barrel(&created.id).await?, StatusCode::NOT_FOUND)
        })
        .await;

        let unknown = fixtures.missing_barrel_id();
        log.run("unknown id returns 404", async {
            expect_status(&client.get_barrel(&unknown).await?, StatusCode::NOT_FOUND)?;
            expect_status(&client.delete_barrel(&unknown).await?, StatusCode::NOT_FOUND)
        })
        .await;

        cleanup_barrels(client, &created_ids).await;

        let result = log.finish(start);
        info!(
            passed = result.passed,
            duration_ms = result.duration.as_millis(),
            "Barrels scenario complete"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_metadata() {
        let scenario = BarrelsScenario;
        assert_eq!(scenario.name(), "barrels");
        assert!(!scenario.description().is_empty());
    }
}
