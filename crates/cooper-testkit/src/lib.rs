//! Cooper Test Kit
//!
//! Test infrastructure for Barrel Monitor testing.
//!
//! This crate provides:
//! - Seeded random data generation for reproducible payloads
//! - An in-process mock Barrel Monitor for exercising scenarios offline
//!
//! # Example
//!
//! ```rust
//! use cooper_testkit::random::PseudoGenerator;
//!
//! // Create reproducible random generator
//! let mut rng = PseudoGenerator::new(12345);
//!
//! // Generate a ULID-shaped tag
//! let rfid = rng.ulid();
//! assert_eq!(rfid.len(), 26);
//! ```

pub mod mock;
pub mod random;

pub use mock::{MockBehavior, MockMonitor};
pub use random::PseudoGenerator;
