//! Live market-data source configuration.

use super::parse_var;
use anyhow::{Result, bail};
use std::time::Duration;

pub const DEFAULT_UPSTREAM_BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

#[derive(Debug, Clone)]
pub struct UpstreamEnvConfig {
    pub base_url: String,
    pub timeout_ms: u64,
    /// Transient-failure retries. The serving path defaults to none.
    pub max_retries: u32,
}

impl Default for UpstreamEnvConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_UPSTREAM_BASE_URL.to_string(),
            timeout_ms: 10_000,
            max_retries: 0,
        }
    }
}

impl UpstreamEnvConfig {
    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: &F) -> Result<Self> {
        let defaults = Self::default();
        let config = Self {
            base_url: lookup("UPSTREAM_BASE_URL").unwrap_or(defaults.base_url),
            timeout_ms: parse_var(lookup, "UPSTREAM_TIMEOUT_MS", defaults.timeout_ms)?,
            max_retries: parse_var(lookup, "UPSTREAM_MAX_RETRIES", defaults.max_retries)?,
        };
        if config.timeout_ms == 0 {
            bail!("UPSTREAM_TIMEOUT_MS must be positive");
        }
        Ok(config)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
