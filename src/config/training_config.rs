//! Training pipeline parameters.

use super::parse_var;
use crate::domain::ml::artifact::ScalerFitPolicy;
use anyhow::{Result, bail};
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct TrainingConfig {
    /// Rows dated on or before this day are excluded
    pub cutoff: NaiveDate,
    /// Trailing share of rows held out for evaluation
    pub test_ratio: f64,
    pub scaler_policy: ScalerFitPolicy,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            cutoff: NaiveDate::from_ymd_opt(2010, 1, 1).unwrap_or(NaiveDate::MIN),
            test_ratio: 0.2,
            scaler_policy: ScalerFitPolicy::FullWindow,
        }
    }
}

impl TrainingConfig {
    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: &F) -> Result<Self> {
        let defaults = Self::default();
        let config = Self {
            cutoff: parse_var(lookup, "TRAINING_CUTOFF_DATE", defaults.cutoff)?,
            test_ratio: parse_var(lookup, "TRAINING_TEST_RATIO", defaults.test_ratio)?,
            scaler_policy: parse_var(lookup, "TRAINING_SCALER_FIT", defaults.scaler_policy)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.test_ratio > 0.0 && self.test_ratio < 1.0) {
            bail!("Test ratio must be within (0, 1), got {}", self.test_ratio);
        }
        Ok(())
    }
}
