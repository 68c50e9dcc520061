use std::env;
use std::time::Duration;

use crate::{Result, TsdbError};

pub const DEFAULT_BASE_URL: &str = "http://localhost:9090";
pub const DEFAULT_STEP_SECS: u64 = 15;
/// Prometheus refuses range queries resolving to more than 11,000 points per series.
pub const DEFAULT_MAX_POINTS_PER_REQUEST: u64 = 11_000;
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Settings for a TSDB client.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub base_url: String,
    pub default_step: u64,
    pub max_points_per_request: u64,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            default_step: DEFAULT_STEP_SECS,
            max_points_per_request: DEFAULT_MAX_POINTS_PER_REQUEST,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Build a config from `PROMETHEUS_URL`, `TSDB_DEFAULT_STEP`,
    /// `TSDB_MAX_POINTS` and `TSDB_TIMEOUT_SECS`. Unset keys keep their defaults.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let base_url = env::var("PROMETHEUS_URL").unwrap_or(defaults.base_url);
        let default_step = positive_from_env("TSDB_DEFAULT_STEP", defaults.default_step)?;
        let max_points_per_request =
            positive_from_env("TSDB_MAX_POINTS", defaults.max_points_per_request)?;
        let timeout_secs = positive_from_env("TSDB_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;

        Ok(Self {
            base_url,
            default_step,
            max_points_per_request,
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    pub fn with_default_step(mut self, step: u64) -> Self {
        self.default_step = step;
        self
    }

    pub fn with_max_points_per_request(mut self, max_points: u64) -> Self {
        self.max_points_per_request = max_points;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(TsdbError::Config("base URL must not be empty".to_string()));
        }
        if self.default_step == 0 {
            return Err(TsdbError::Config("default step must be at least 1".to_string()));
        }
        if self.max_points_per_request == 0 {
            return Err(TsdbError::Config(
                "max points per request must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn positive_from_env(key: &str, default: u64) -> Result<u64> {
    match env::var(key) {
        Ok(raw) => parse_positive(key, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_positive(key: &str, raw: &str) -> Result<u64> {
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(TsdbError::Config(format!("{} must be at least 1", key))),
        Ok(value) => Ok(value),
        Err(e) => Err(TsdbError::Config(format!("{}={:?}: {}", key, raw, e))),
    }
}
