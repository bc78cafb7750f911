//! Out-of-sample error metrics, computed in original price scale.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationMetrics {
    pub mae: f64,
    pub rmse: f64,
    /// Percent. `None` when every true value is zero.
    pub mape: Option<f64>,
    pub test_samples: usize,
    pub mape_samples: usize,
}

impl EvaluationMetrics {
    pub fn compute(actuals: &[f64], predictions: &[f64]) -> Self {
        let (mape, mape_samples) = mean_absolute_percentage_error(actuals, predictions);
        Self {
            mae: mean_absolute_error(actuals, predictions),
            rmse: root_mean_squared_error(actuals, predictions),
            mape,
            test_samples: actuals.len().min(predictions.len()),
            mape_samples,
        }
    }
}

pub fn mean_absolute_error(actuals: &[f64], predictions: &[f64]) -> f64 {
    let n = actuals.len().min(predictions.len());
    if n == 0 {
        return 0.0;
    }
    actuals
        .iter()
        .zip(predictions)
        .map(|(t, p)| (t - p).abs())
        .sum::<f64>()
        / n as f64
}

pub fn root_mean_squared_error(actuals: &[f64], predictions: &[f64]) -> f64 {
    let n = actuals.len().min(predictions.len());
    if n == 0 {
        return 0.0;
    }
    let sq_err: f64 = actuals
        .iter()
        .zip(predictions)
        .map(|(t, p)| (t - p).powi(2))
        .sum();
    (sq_err / n as f64).sqrt()
}

/// MAPE in percent over samples whose true value is non-zero.
/// Returns the metric and how many samples it averaged.
pub fn mean_absolute_percentage_error(actuals: &[f64], predictions: &[f64]) -> (Option<f64>, usize) {
    let ratios: Vec<f64> = actuals
        .iter()
        .zip(predictions)
        .filter(|(t, _)| **t != 0.0)
        .map(|(t, p)| ((t - p) / t).abs())
        .collect();

    if ratios.is_empty() {
        return (None, 0);
    }
    let mean = ratios.iter().sum::<f64>() / ratios.len() as f64;
    (Some(mean * 100.0), ratios.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mae_and_rmse() {
        let actuals = [10.0, 20.0, 30.0];
        let preds = [11.0, 18.0, 30.0];
        assert!((mean_absolute_error(&actuals, &preds) - 1.0).abs() < 1e-12);
        assert!((root_mean_squared_error(&actuals, &preds) - (5.0f64 / 3.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_mape_excludes_only_zero_targets() {
        let actuals = [100.0, 0.0, 50.0];
        let preds = [110.0, 7.0, 45.0];
        let (mape, used) = mean_absolute_percentage_error(&actuals, &preds);

        assert_eq!(used, 2);
        // (10% + 10%) / 2, the zero row contributes nothing
        assert!((mape.unwrap() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_mape_all_zero_is_none() {
        let (mape, used) = mean_absolute_percentage_error(&[0.0, 0.0], &[1.0, 2.0]);
        assert!(mape.is_none());
        assert_eq!(used, 0);
    }

    #[test]
    fn test_compute_bundles_all_metrics() {
        let m = EvaluationMetrics::compute(&[100.0, 0.0], &[90.0, 1.0]);
        assert_eq!(m.test_samples, 2);
        assert_eq!(m.mape_samples, 1);
        assert!((m.mae - 5.5).abs() < 1e-12);
        assert!((m.mape.unwrap() - 10.0).abs() < 1e-9);
    }
}
