//! Cooper - Barrel Monitor API Conformance Suite
//!
//! End-to-end scenarios that exercise a deployed Barrel Monitor service's
//! `/barrels` and `/measurements` endpoints and check status codes, response
//! bodies and validation messages.
//!
//! ## Architecture
//!
//! - Scenarios build fixtures, call the service and validate every response
//! - Each scenario is independent and runs as its own task
//! - Runs are reproducible from a seed
//! - An optional HTTP status API reports progress and Prometheus metrics
//!
//! ## Modules
//!
//! - [`client`] - HTTP client for the Barrel Monitor API
//! - [`schema`] - JSON Schemas for entities and error envelopes
//! - [`fixtures`] - Seeded, schema-valid request payloads
//! - [`verify`] - Response validators
//! - [`scenarios`] - Scenario implementations and registry
//! - [`runner`] - Parallel scenario execution
//! - [`config`] - Configuration parsing (target, scenarios)
//! - [`api`] - Status HTTP API
//! - [`report`] - JSON run report

pub mod api;
pub mod client;
pub mod config;
pub mod fixtures;
pub mod report;
pub mod runner;
pub mod scenarios;
pub mod schema;
pub mod utils;
pub mod verify;
