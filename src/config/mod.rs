//! Configuration parsing
//!
//! Handles parsing of the target configuration file and scenario options.
//! Every key is optional; the base URL can also come from `--base-url` or
//! `BARREL_MONITOR_URL`.
//!
//! ## Configuration Format
//!
//! ```yaml
//! target:
//!   name: local
//!   base_url: http://localhost:5000
//!   request_timeout: 30s
//!
//! seed: 42
//!
//! scenarios:
//!   barrels:
//!     enabled: true
//!     timeout: 5m
//!     retries: 1
//!
//!   barrel-concurrency:
//!     enabled: true
//!     parallel_requests: 10
//! ```

mod target;

pub use target::{
    BASE_URL_ENV, Config, ConfigError, DEFAULT_CONFIG_FILE, ScenarioConfig, TargetConfig,
};
