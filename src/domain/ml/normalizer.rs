//! Min-max normalizers.
//!
//! Each state maps its training range per column onto [0, 1]. Values outside
//! the range extrapolate linearly; nothing is clamped. A column whose min
//! equals its max is scaled with a unit range, so training values map to 0
//! and the transform stays exactly invertible.

use crate::domain::errors::ModelError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizerState {
    pub min: Vec<f64>,
    pub max: Vec<f64>,
}

impl NormalizerState {
    /// Records per-column min and max. Rows must share one width.
    pub fn fit<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self, ModelError> {
        let width = rows
            .first()
            .map(|r| r.as_ref().len())
            .ok_or(ModelError::DimensionMismatch {
                expected: 1,
                got: 0,
            })?;

        let mut min = vec![f64::INFINITY; width];
        let mut max = vec![f64::NEG_INFINITY; width];

        for row in rows {
            let row = row.as_ref();
            if row.len() != width {
                return Err(ModelError::DimensionMismatch {
                    expected: width,
                    got: row.len(),
                });
            }
            for (col, &v) in row.iter().enumerate() {
                min[col] = min[col].min(v);
                max[col] = max[col].max(v);
            }
        }

        Ok(Self { min, max })
    }

    /// Single-column convenience for the target
    pub fn fit_values(values: &[f64]) -> Result<Self, ModelError> {
        let rows: Vec<[f64; 1]> = values.iter().map(|&v| [v]).collect();
        Self::fit(&rows)
    }

    pub fn width(&self) -> usize {
        self.min.len()
    }

    fn range(&self, col: usize) -> f64 {
        let range = self.max[col] - self.min[col];
        if range == 0.0 { 1.0 } else { range }
    }

    fn check_width(&self, got: usize) -> Result<(), ModelError> {
        if got != self.width() {
            return Err(ModelError::DimensionMismatch {
                expected: self.width(),
                got,
            });
        }
        Ok(())
    }

    pub fn transform(&self, row: &[f64]) -> Result<Vec<f64>, ModelError> {
        self.check_width(row.len())?;
        Ok(row
            .iter()
            .enumerate()
            .map(|(col, &v)| (v - self.min[col]) / self.range(col))
            .collect())
    }

    pub fn inverse_transform(&self, row: &[f64]) -> Result<Vec<f64>, ModelError> {
        self.check_width(row.len())?;
        Ok(row
            .iter()
            .enumerate()
            .map(|(col, &v)| v * self.range(col) + self.min[col])
            .collect())
    }

    pub fn transform_value(&self, value: f64) -> Result<f64, ModelError> {
        self.check_width(1)?;
        Ok((value - self.min[0]) / self.range(0))
    }

    pub fn inverse_value(&self, scaled: f64) -> Result<f64, ModelError> {
        self.check_width(1)?;
        Ok(scaled * self.range(0) + self.min[0])
    }
}

/// Feature scaler and target scaler fitted together and stored together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizerPair {
    pub features: NormalizerState,
    pub target: NormalizerState,
}
