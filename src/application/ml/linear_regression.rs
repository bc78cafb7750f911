//! Ordinary least squares over scaled features (SmartCore).
//!
//! No regularisation and no hyperparameters. The fitted map is read back
//! into a plain [`LinearModel`] so persisted bundles do not depend on
//! SmartCore's internal serialisation layout.

use crate::domain::errors::ModelError;
use crate::domain::ml::linear_model::LinearModel;
use smartcore::linalg::basic::arrays::Array;
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::linear::linear_regression::{
    LinearRegression, LinearRegressionParameters, LinearRegressionSolverName,
};
use tracing::debug;

type SmartCoreOls = LinearRegression<f64, f64, DenseMatrix<f64>, Vec<f64>>;

pub struct OlsRegressor {
    solver: LinearRegressionSolverName,
}

impl Default for OlsRegressor {
    fn default() -> Self {
        // SVD copes with the near-collinear open/high/low columns
        Self {
            solver: LinearRegressionSolverName::SVD,
        }
    }
}

impl OlsRegressor {
    pub fn fit<R: AsRef<[f64]>>(&self, x: &[R], y: &[f64]) -> Result<LinearModel, ModelError> {
        if x.len() != y.len() {
            return Err(ModelError::DimensionMismatch {
                expected: x.len(),
                got: y.len(),
            });
        }
        let width = x.first().map(|r| r.as_ref().len()).unwrap_or(0);
        if width == 0 || x.len() <= width {
            return Err(ModelError::Fit(format!(
                "need more than {} samples, got {}",
                width,
                x.len()
            )));
        }

        let rows: Vec<Vec<f64>> = x.iter().map(|r| r.as_ref().to_vec()).collect();
        let x_matrix =
            DenseMatrix::from_2d_vec(&rows).map_err(|e| ModelError::Matrix(e.to_string()))?;
        let targets = y.to_vec();

        let params = LinearRegressionParameters::default().with_solver(self.solver.clone());
        let fitted = SmartCoreOls::fit(&x_matrix, &targets, params)
            .map_err(|e| ModelError::Fit(e.to_string()))?;

        let model = read_affine_map(&fitted, width)?;
        if !model.is_finite() {
            return Err(ModelError::NonFinite);
        }
        debug!(
            "OLS fit on {} samples: intercept={:.6}, coefficients={:?}",
            x.len(),
            model.intercept,
            model.coefficients
        );
        Ok(model)
    }
}

/// Copies the fitted weights and intercept out of SmartCore.
fn read_affine_map(fitted: &SmartCoreOls, width: usize) -> Result<LinearModel, ModelError> {
    let coefficients: Vec<f64> = fitted.coefficients().iterator(0).copied().collect();
    if coefficients.len() != width {
        return Err(ModelError::DimensionMismatch {
            expected: width,
            got: coefficients.len(),
        });
    }

    Ok(LinearModel {
        coefficients,
        intercept: *fitted.intercept(),
    })
}
