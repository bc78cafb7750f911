//! Persisted artifact bundle: a fitted model together with the normalizers
//! it was trained against, in one schema.

use super::feature_registry::{matches_registry, registry_names};
use super::linear_model::LinearModel;
use super::metrics::EvaluationMetrics;
use super::normalizer::NormalizerPair;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

pub const BUNDLE_SCHEMA_VERSION: u32 = 1;

/// Which rows the normalizers are fitted on.
///
/// `FullWindow` fits on every row, test segment included. That leaks the
/// test range into the scalers; it is kept as the default because served
/// models have always been trained that way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScalerFitPolicy {
    #[default]
    FullWindow,
    TrainOnly,
}

impl FromStr for ScalerFitPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "full" | "full-window" => Ok(ScalerFitPolicy::FullWindow),
            "train-only" | "train" => Ok(ScalerFitPolicy::TrainOnly),
            _ => Err(format!(
                "Invalid scaler fit policy: {}. Must be 'full' or 'train-only'",
                s
            )),
        }
    }
}

impl fmt::Display for ScalerFitPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalerFitPolicy::FullWindow => write!(f, "full"),
            ScalerFitPolicy::TrainOnly => write!(f, "train-only"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifactBundle {
    pub schema_version: u32,
    pub symbol: String,
    pub dataset: String,
    /// Monotonic per symbol; bumped by every successful retrain
    pub version: u64,
    pub trained_at: DateTime<Utc>,
    pub scaler_policy: ScalerFitPolicy,
    pub feature_names: Vec<String>,
    pub model: LinearModel,
    pub normalizers: NormalizerPair,
    pub metrics: Option<EvaluationMetrics>,
    pub training_rows: usize,
    pub content_hash: String,
}

#[derive(Serialize)]
struct HashedContent<'a> {
    symbol: &'a str,
    feature_names: &'a [String],
    model: &'a LinearModel,
    normalizers: &'a NormalizerPair,
}

impl ModelArtifactBundle {
    pub fn new(
        symbol: &str,
        dataset: &str,
        scaler_policy: ScalerFitPolicy,
        model: LinearModel,
        normalizers: NormalizerPair,
        metrics: Option<EvaluationMetrics>,
        training_rows: usize,
    ) -> Result<Self, serde_json::Error> {
        let mut bundle = Self {
            schema_version: BUNDLE_SCHEMA_VERSION,
            symbol: symbol.to_string(),
            dataset: dataset.to_string(),
            version: 0,
            trained_at: Utc::now(),
            scaler_policy,
            feature_names: registry_names(),
            model,
            normalizers,
            metrics,
            training_rows,
            content_hash: String::new(),
        };
        bundle.content_hash = bundle.compute_hash()?;
        Ok(bundle)
    }

    /// Hex SHA-256 over the parts that determine predictions.
    pub fn compute_hash(&self) -> Result<String, serde_json::Error> {
        let content = serde_json::to_vec(&HashedContent {
            symbol: &self.symbol,
            feature_names: &self.feature_names,
            model: &self.model,
            normalizers: &self.normalizers,
        })?;
        Ok(hex::encode(Sha256::digest(&content)))
    }

    /// Checks the bundle is internally coherent. Returns the reason when not.
    pub fn validate(&self) -> Result<(), String> {
        if self.schema_version != BUNDLE_SCHEMA_VERSION {
            return Err(format!(
                "schema v{} not supported (expected v{})",
                self.schema_version, BUNDLE_SCHEMA_VERSION
            ));
        }
        if !matches_registry(&self.feature_names) {
            return Err(format!("feature order {:?} differs", self.feature_names));
        }
        let width = self.feature_names.len();
        if self.model.coefficients.len() != width
            || self.normalizers.features.width() != width
            || self.normalizers.target.width() != 1
        {
            return Err("model and normalizer widths disagree".to_string());
        }
        let hash = self.compute_hash().map_err(|e| e.to_string())?;
        if hash != self.content_hash {
            return Err(format!(
                "content hash mismatch: stored {}, computed {}",
                self.content_hash, hash
            ));
        }
        Ok(())
    }
}
