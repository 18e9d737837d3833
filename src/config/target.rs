//! Target and scenario configuration types
//!
//! Defines the structure of `cooper.yaml`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::client::{DEFAULT_REQUEST_TIMEOUT, MonitorClient};
use crate::scenarios::{ScenarioContext, ScenarioOptions};

/// Environment variable naming the service under test
pub const BASE_URL_ENV: &str = "BARREL_MONITOR_URL";

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "cooper.yaml";

/// Errors that can occur during configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to create client: {0}")]
    Client(#[from] crate::client::MonitorError),
}

/// The deployment under test
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Label used in logs and the report
    #[serde(default = "default_target_name")]
    pub name: String,

    /// Base URL of the Barrel Monitor API (e.g., "http://localhost:5000")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Per-request timeout
    #[serde(default = "default_request_timeout", with = "humantime_serde")]
    pub request_timeout: Duration,
}

fn default_target_name() -> String {
    "default".to_string()
}

fn default_request_timeout() -> Duration {
    DEFAULT_REQUEST_TIMEOUT
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            name: default_target_name(),
            base_url: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl TargetConfig {
    /// Build a client for this target
    pub fn to_client(&self) -> Result<MonitorClient, ConfigError> {
        let base_url = self.base_url.as_deref().ok_or_else(|| {
            ConfigError::Invalid(format!(
                "no base URL: set target.base_url, --base-url or {BASE_URL_ENV}"
            ))
        })?;

        let http = reqwest::Client::builder()
            .timeout(self.request_timeout)
            .build()
            .map_err(crate::client::MonitorError::from)?;

        Ok(MonitorClient::with_client(base_url, http)?.with_name(&self.name))
    }
}

/// Configuration for a single scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioConfig {
    /// Whether this scenario is enabled
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Timeout for this scenario
    #[serde(
        default,
        with = "humantime_serde",
        skip_serializing_if = "Option::is_none"
    )]
    pub timeout: Option<Duration>,

    /// Number of re-runs after a failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retries: Option<u32>,

    /// Delay between re-runs
    #[serde(
        default,
        with = "humantime_serde",
        skip_serializing_if = "Option::is_none"
    )]
    pub retry_delay: Option<Duration>,

    /// Additional scenario-specific options
    #[serde(default, flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

fn default_enabled() -> bool {
    true
}

impl ScenarioConfig {
    /// Overlay this config on a scenario's defaults
    pub fn to_scenario_options(&self, defaults: &ScenarioOptions) -> ScenarioOptions {
        let mut extra = defaults.extra.clone();
        extra.extend(self.extra.clone());
        ScenarioOptions {
            timeout: self.timeout.or(defaults.timeout),
            retries: self.retries.unwrap_or(defaults.retries),
            retry_delay: self.retry_delay.or(defaults.retry_delay),
            extra,
        }
    }
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout: None,
            retries: None,
            retry_delay: None,
            extra: HashMap::new(),
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub target: TargetConfig,

    /// Fixture seed; a random one is drawn when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// Scenario configurations (scenario_name -> config)
    #[serde(default)]
    pub scenarios: HashMap<String, ScenarioConfig>,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Load `path` if it exists, otherwise start from defaults
    pub fn from_file_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Replace the target URL when `base_url` is given
    pub fn with_base_url(mut self, base_url: Option<String>) -> Self {
        if base_url.is_some() {
            self.target.base_url = base_url;
        }
        self
    }

    /// Get configuration for a specific scenario
    pub fn scenario_config(&self, name: &str) -> Option<&ScenarioConfig> {
        self.scenarios.get(name)
    }

    /// Check if a specific scenario is enabled
    pub fn is_scenario_enabled(&self, name: &str) -> bool {
        self.scenarios.get(name).map(|c| c.enabled).unwrap_or(true)
    }

    /// Build the context every scenario of a run shares
    pub fn to_scenario_context(&self, seed: u64) -> Result<ScenarioContext, ConfigError> {
        Ok(ScenarioContext::new(self.target.to_client()?, seed))
    }

    /// Generate a default configuration
    pub fn default_config() -> Self {
        let mut concurrency = ScenarioConfig::default();
        concurrency
            .extra
            .insert("parallel_requests".to_string(), serde_json::json!(10));

        Config {
            target: TargetConfig {
                name: "local".to_string(),
                base_url: Some("http://localhost:5000".to_string()),
                request_timeout: DEFAULT_REQUEST_TIMEOUT,
            },
            seed: None,
            scenarios: {
                let mut scenarios = HashMap::new();
                for name in [
                    "barrels",
                    "barrel-validation",
                    "barrel-protocol",
                    "measurements",
                    "measurement-validation",
                ] {
                    scenarios.insert(name.to_string(), ScenarioConfig::default());
                }
                scenarios.insert("barrel-concurrency".to_string(), concurrency);
                scenarios
            },
        }
    }

    /// Serialize to YAML string
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_CONFIG: &str = r"
target:
  name: staging
  base_url: http://monitor.staging:8080
  request_timeout: 10s

seed: 42

scenarios:
  barrels:
    enabled: true
    timeout: 5m
    retries: 2
  barrel-protocol:
    enabled: false
  barrel-concurrency:
    parallel_requests: 25
";

    #[test]
    fn test_parse_config() {
        let config = Config::from_yaml(SAMPLE_CONFIG).unwrap();
        assert_eq!(config.target.name, "staging");
        assert_eq!(
            config.target.base_url.as_deref(),
            Some("http://monitor.staging:8080")
        );
        assert_eq!(config.target.request_timeout, Duration::from_secs(10));
        assert_eq!(config.seed, Some(42));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_yaml("{}").unwrap();
        assert_eq!(config.target.name, "default");
        assert!(config.target.base_url.is_none());
        assert_eq!(config.target.request_timeout, DEFAULT_REQUEST_TIMEOUT);
        assert!(config.scenarios.is_empty());
    }

    #[test]
    fn test_scenario_enabled() {
        let config = Config::from_yaml(SAMPLE_CONFIG).unwrap();
        assert!(config.is_scenario_enabled("barrels"));
        assert!(!config.is_scenario_enabled("barrel-protocol"));
        assert!(config.is_scenario_enabled("unknown"));
    }

    #[test]
    fn test_scenario_options_overlay() {
        let config = Config::from_yaml(SAMPLE_CONFIG).unwrap();
        let defaults = ScenarioOptions {
            timeout: Some(Duration::from_secs(120)),
            retries: 0,
            retry_delay: Some(Duration::from_secs(2)),
            extra: HashMap::new(),
        };

        let barrels = config
            .scenario_config("barrels")
            .unwrap()
            .to_scenario_options(&defaults);
        assert_eq!(barrels.timeout, Some(Duration::from_secs(300)));
        assert_eq!(barrels.retries, 2);
        assert_eq!(barrels.retry_delay, Some(Duration::from_secs(2)));

        let concurrency = config
            .scenario_config("barrel-concurrency")
            .unwrap()
            .to_scenario_options(&defaults);
        assert_eq!(concurrency.get_extra::<usize>("parallel_requests"), Some(25));
    }

    #[test]
    fn test_base_url_override() {
        let config = Config::from_yaml(SAMPLE_CONFIG)
            .unwrap()
            .with_base_url(Some("http://127.0.0.1:9000".to_string()));
        assert_eq!(config.target.base_url.as_deref(), Some("http://127.0.0.1:9000"));

        let kept = Config::from_yaml(SAMPLE_CONFIG).unwrap().with_base_url(None);
        assert_eq!(
            kept.target.base_url.as_deref(),
            Some("http://monitor.staging:8080")
        );
    }

    #[test]
    fn test_missing_base_url_is_invalid() {
        let err = Config::default().to_scenario_context(1).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        assert!(err.to_string().contains(BASE_URL_ENV));
    }

    #[test]
    fn test_scenario_context_from_config() {
        let ctx = Config::default_config().to_scenario_context(7).unwrap();
        assert_eq!(ctx.seed, 7);
        assert_eq!(ctx.client.name(), Some("local"));
    }

    #[test]
    fn test_default_config_covers_registry() {
        let config = Config::default_config();
        for name in crate::scenarios::list_scenarios() {
            assert!(config.scenarios.contains_key(name), "{name} missing");
        }
    }

    #[test]
    fn test_roundtrip() {
        let config = Config::default_config();
        let yaml = config.to_yaml().unwrap();
        let parsed = Config::from_yaml(&yaml).unwrap();
        assert_eq!(config.target.base_url, parsed.target.base_url);
        assert_eq!(
            parsed.scenario_config("barrel-concurrency").unwrap().extra["parallel_requests"],
            10
        );
    }
}
