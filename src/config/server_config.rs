//! HTTP server configuration parsing from environment variables.

use super::parse_var;
use anyhow::{Result, bail};

pub const MIN_CHART_LIMIT: usize = 30;
pub const MAX_CHART_LIMIT: usize = 1000;

#[derive(Debug, Clone)]
pub struct ServerEnvConfig {
    pub bind_address: String,
    pub port: u16,
    /// History points attached to each prediction
    pub chart_window: usize,
    /// `/chart` limit when the query omits one
    pub chart_default_limit: usize,
}

impl Default for ServerEnvConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 8000,
            chart_window: 30,
            chart_default_limit: 120,
        }
    }
}

impl ServerEnvConfig {
    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: &F) -> Result<Self> {
        let defaults = Self::default();
        let config = Self {
            bind_address: lookup("STOCKEYE_BIND_ADDRESS").unwrap_or(defaults.bind_address),
            port: parse_var(lookup, "STOCKEYE_PORT", defaults.port)?,
            chart_window: parse_var(lookup, "STOCKEYE_CHART_WINDOW", defaults.chart_window)?,
            chart_default_limit: parse_var(
                lookup,
                "STOCKEYE_CHART_DEFAULT_LIMIT",
                defaults.chart_default_limit,
            )?,
        };

        if config.chart_window == 0 {
            bail!("STOCKEYE_CHART_WINDOW must be positive");
        }
        if !(MIN_CHART_LIMIT..=MAX_CHART_LIMIT).contains(&config.chart_default_limit) {
            bail!(
                "STOCKEYE_CHART_DEFAULT_LIMIT must be within {}..={}",
                MIN_CHART_LIMIT,
                MAX_CHART_LIMIT
            );
        }
        Ok(config)
    }

    pub fn socket_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}
