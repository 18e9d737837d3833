//! Scenario suites for the Barrel Monitor API
//!
//! This module provides the `Scenario` trait and one implementation per
//! group of end-to-end cases.
//!
//! ## Scenarios
//!
//! - **barrels**: create, fetch, list, delete
//! - **barrel-validation**: required-field and type errors on barrel create
//! - **barrel-protocol**: 405 for PUT/PATCH, 415 for non-JSON bodies
//! - **barrel-concurrency**: parallel creates each return 201
//! - **measurements**: create, fetch, list, unknown barrel, cascade delete
//! - **measurement-validation**: required, type and negative-value errors
//!
//! ## Adding New Scenarios
//!
//! 1. Create a new file in `src/scenarios/` (e.g., `myscenario.rs`)
//! 2. Implement the `Scenario` trait
//! 3. Register in `registry.rs`
//! 4. Add to `mod.rs` exports

mod barrel_validation;
mod barrels;
pub mod common;
mod concurrency;
mod measurement_validation;
mod measurements;
mod protocol;
pub mod registry;
mod traits;

pub use barrel_validation::BarrelValidationScenario;
pub use barrels::BarrelsScenario;
pub use concurrency::{BarrelConcurrencyScenario, DEFAULT_PARALLEL_REQUESTS};
pub use measurement_validation::MeasurementValidationScenario;
pub use measurements::MeasurementsScenario;
pub use protocol::BarrelProtocolScenario;
pub use registry::{SCENARIOS, get_scenario, list_scenarios};
pub use traits::*;
