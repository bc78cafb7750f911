//! Symbol registry: the closed set of instruments the system trains and serves.
//!
//! Loaded from a TOML file so the set can be edited without a rebuild, and
//! validated once at startup.
//!
//! ```toml
//! [[symbols]]
//! key = "AAPL"
//! dataset = "AAPL_stock_data.csv"
//! ticker = "AAPL"
//! name = "Apple Inc."
//! ```

use crate::domain::errors::UnsupportedSymbolError;
use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::info;

const ARTIFACT_SUFFIX: &str = "_lr_bundle.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolEntry {
    pub key: String,
    pub dataset: String,
    pub artifact: String,
    /// Ticker understood by the live feature source
    pub ticker: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct RegistryFile {
    symbols: Vec<RawEntry>,
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    key: String,
    dataset: String,
    artifact: Option<String>,
    ticker: String,
    name: String,
}

/// Derives the bundle file name from the dataset file name:
/// `AAPL_stock_data.csv` -> `AAPL_stock_data_lr_bundle.json`.
pub fn artifact_name_for(dataset: &str) -> String {
    let stem = dataset.strip_suffix(".csv").unwrap_or(dataset);
    format!("{}{}", stem, ARTIFACT_SUFFIX)
}

impl SymbolEntry {
    pub fn new(key: &str, dataset: &str, ticker: &str, name: &str) -> Self {
        Self {
            key: key.to_string(),
            dataset: dataset.to_string(),
            artifact: artifact_name_for(dataset),
            ticker: ticker.to_string(),
            name: name.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SymbolRegistry {
    entries: Vec<SymbolEntry>,
}

impl SymbolRegistry {
    pub fn new(entries: Vec<SymbolEntry>) -> Result<Self> {
        let registry = Self { entries };
        registry.validate()?;
        Ok(registry)
    }

    /// Registry used when no registry file exists
    pub fn builtin() -> Self {
        Self {
            entries: vec![
                SymbolEntry::new("AAPL", "AAPL_stock_data.csv", "AAPL", "Apple Inc."),
                SymbolEntry::new("2222.SR", "2222.sr_stock_data.csv", "2222.SR", "Saudi Aramco"),
            ],
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: RegistryFile = toml::from_str(content).context("Failed to parse symbol registry")?;
        let entries = file
            .symbols
            .into_iter()
            .map(|raw| SymbolEntry {
                artifact: raw.artifact.unwrap_or_else(|| artifact_name_for(&raw.dataset)),
                key: raw.key,
                dataset: raw.dataset,
                ticker: raw.ticker,
                name: raw.name,
            })
            .collect();
        Self::new(entries)
    }

    /// Loads the registry file, falling back to the built-in set when absent.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!(
                "Symbol registry {:?} not found, using built-in registry",
                path
            );
            return Ok(Self::builtin());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read symbol registry {:?}", path))?;
        let registry = Self::from_toml_str(&content)?;
        info!(
            "Loaded {} symbols from {:?}",
            registry.entries.len(),
            path
        );
        Ok(registry)
    }

    fn validate(&self) -> Result<()> {
        if self.entries.is_empty() {
            bail!("Symbol registry is empty");
        }

        let mut keys = HashSet::new();
        let mut artifacts = HashSet::new();
        for entry in &self.entries {
            if entry.key.trim().is_empty() {
                bail!("Symbol registry entry with empty key");
            }
            if !keys.insert(entry.key.as_str()) {
                bail!("Duplicate symbol key: {}", entry.key);
            }
            if !entry.dataset.ends_with(".csv") {
                bail!(
                    "Dataset for {} must be a .csv file, got {}",
                    entry.key,
                    entry.dataset
                );
            }
            if entry.ticker.trim().is_empty() {
                bail!("Symbol {} has no ticker", entry.key);
            }
            if !artifacts.insert(entry.artifact.as_str()) {
                bail!(
                    "Artifact {} is shared by more than one symbol",
                    entry.artifact
                );
            }
        }
        Ok(())
    }

    /// Looks a key up without touching disk or network.
    pub fn resolve(&self, key: &str) -> Result<&SymbolEntry, UnsupportedSymbolError> {
        self.entries
            .iter()
            .find(|e| e.key == key)
            .ok_or_else(|| UnsupportedSymbolError {
                symbol: key.to_string(),
            })
    }

    pub fn entries(&self) -> &[SymbolEntry] {
        &self.entries
    }
}
