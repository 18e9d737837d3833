//! Barrel Protocol Scenario
//!
//! Transport-level rejections. Only the status code is asserted.
//!
//! - PUT and PATCH on `/barrels` and `/barrels/{id}` return 405
//! - POST /barrels with a non-JSON content type returns 415

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use std::time::Instant;
use tracing::{info, warn};

use super::common::{cleanup_barrels, create_barrel};
use super::traits::{
    CaseLog, Scenario, ScenarioContext, ScenarioError, ScenarioOptions, ScenarioResult,
};
use crate::client::{MonitorError, RequestBody};
use crate::verify::expect_status;

/// Methods the service does not route
const UNSUPPORTED_METHODS: [Method; 2] = [Method::PUT, Method::PATCH];

/// Unsupported method and content-type handling
pub struct BarrelProtocolScenario;

#[async_trait]
impl Scenario for BarrelProtocolScenario {
    fn name(&self) -> &'static str {
        "barrel-protocol"
    }

    fn description(&self) -> &'static str {
        "Reject unsupported methods (405) and content types (415)"
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

        info!(seed = fixtures.seed(), "Starting barrel protocol scenario");

        // Item routes are probed on a live barrel when one can be created
        let existing = match create_barrel(client, &fixtures.barrel()).await {
            Ok(barrel) => Some(barrel),
            Err(e) => {
                warn!(error = %e, "Barrel setup failed, probing item routes with an unknown id");
                None
            }
        };
        let item_id = match &existing {
            Some(barrel) => barrel.id.clone(),
            None => fixtures.missing_barrel_id(),
        };
        let item_path = format!("barrels/{item_id}");

        for method in UNSUPPORTED_METHODS {
            for path in ["barrels", item_path.as_str()] {
                let body = serde_json::to_value(fixtures.barrel())
                    .map_err(MonitorError::Encode)?;
                let method = method.clone();
                log.run(format!("{method} /{path} returns 405"), async {
                    let response = client
                        .send(method, path, Some(RequestBody::Json(body)))
                        .await?;
                    expect_status(&response, StatusCode::METHOD_NOT_ALLOWED)
                })
                .await;
            }
        }

        let payload = serde_json::to_vec(&fixtures.barrel())
            .map_err(MonitorError::Encode)?;
        log.run("text/plain create returns 415", async {
            let body = RequestBody::Raw {
                content_type: "text/plain".to_string(),
                bytes: payload,
            };
            let response = client.send(Method::POST, "barrels", Some(body)).await?;
            expect_status(&response, StatusCode::UNSUPPORTED_MEDIA_TYPE)
        })
        .await;

        if let Some(barrel) = existing {
            cleanup_barrels(client, &[barrel.value.id]).await;
        }

        Ok(log.finish(start))
    }
}
