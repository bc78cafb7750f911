//! Configuration module for StockEye.
//!
//! This module provides structured configuration loading from environment variables,
//! organized by concern: Storage, Server, Upstream and Training. The symbol
//! registry lives in its own TOML file (see [`registry`]).

mod registry;
mod server_config;
mod storage_config;
mod training_config;
mod upstream_config;

pub use registry::{SymbolEntry, SymbolRegistry, artifact_name_for};
pub use server_config::{MAX_CHART_LIMIT, MIN_CHART_LIMIT, ServerEnvConfig};
pub use storage_config::StorageEnvConfig;
pub use training_config::TrainingConfig;
pub use upstream_config::UpstreamEnvConfig;

use anyhow::{Context, Result};
use std::env;
use std::fmt::Display;
use std::str::FromStr;

/// Parses `key` through `lookup`, using `default` when unset.
/// A set but malformed value is an error rather than a silent default.
pub(crate) fn parse_var<T, F>(lookup: &F, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{}", e))
            .with_context(|| format!("Invalid {}: {}", key, raw)),
        None => Ok(default),
    }
}

/// Main application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub storage: StorageEnvConfig,
    pub server: ServerEnvConfig,
    pub upstream: UpstreamEnvConfig,
    pub training: TrainingConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            storage: StorageEnvConfig::from_lookup(&lookup),
            server: ServerEnvConfig::from_lookup(&lookup).context("Failed to load server config")?,
            upstream: UpstreamEnvConfig::from_lookup(&lookup)
                .context("Failed to load upstream config")?,
            training: TrainingConfig::from_lookup(&lookup)
                .context("Failed to load training config")?,
        })
    }

    pub fn load_registry(&self) -> Result<SymbolRegistry> {
        SymbolRegistry::load(&self.storage.registry_path)
    }
}
