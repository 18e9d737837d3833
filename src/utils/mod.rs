//! Utility modules for cooper
//!
//! Helpers shared by the scenarios.

pub mod concurrent;

pub use concurrent::{FanOutOpts, Job, JobOutcome, fan_out};
