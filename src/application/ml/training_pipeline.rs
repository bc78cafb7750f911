//! Offline training: records -> features -> scalers -> OLS -> evaluated bundle.
//!
//! The split is chronological (no shuffling): the trailing `test_ratio` share
//! of the window is held out and scored in original price units.

use crate::application::ml::feature_builder::FeatureSetBuilder;
use crate::application::ml::linear_regression::OlsRegressor;
use crate::config::{SymbolEntry, TrainingConfig};
use crate::domain::errors::{ArtifactError, DataError, TrainingError};
use crate::domain::ml::artifact::{ModelArtifactBundle, ScalerFitPolicy};
use crate::domain::ml::feature_registry::FEATURE_COUNT;
use crate::domain::ml::metrics::EvaluationMetrics;
use crate::domain::ml::normalizer::{NormalizerPair, NormalizerState};
use crate::domain::types::TimeSeriesRecord;
use crate::infrastructure::artifact_store::ArtifactStore;
use crate::infrastructure::dataset::{DatasetRepository, read_records};
use rayon::prelude::*;
use tracing::{error, info};

/// Outcome of one symbol's training run
#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub symbol: String,
    pub rows: usize,
    pub train_rows: usize,
    pub test_rows: usize,
    pub metrics: EvaluationMetrics,
    pub bundle: ModelArtifactBundle,
}

pub struct TrainingPipeline {
    config: TrainingConfig,
    regressor: OlsRegressor,
}

impl TrainingPipeline {
    pub fn new(config: TrainingConfig) -> Self {
        Self {
            config,
            regressor: OlsRegressor::default(),
        }
    }

    /// Returns `(train, test)` row counts for a window of `rows`.
    ///
    /// The test share is rounded up, and the train share must leave OLS
    /// more samples than features.
    pub fn split_sizes(&self, rows: usize) -> Result<(usize, usize), DataError> {
        let test = ((rows as f64) * self.config.test_ratio).ceil() as usize;
        let test = test.min(rows);
        let train = rows - test;
        if test == 0 || train < FEATURE_COUNT + 1 {
            return Err(DataError::DegenerateSplit { rows, train, test });
        }
        Ok((train, test))
    }

    /// Fits and evaluates a model for `symbol`. Nothing is persisted.
    pub fn fit(
        &self,
        symbol: &str,
        dataset: &str,
        records: &[TimeSeriesRecord],
    ) -> Result<TrainingReport, TrainingError> {
        let set = FeatureSetBuilder::new(self.config.cutoff).build(records)?;
        let (train_rows, test_rows) = self.split_sizes(set.len())?;

        let rows: Vec<[f64; FEATURE_COUNT]> = set.features.iter().map(|f| f.0).collect();
        let fit_rows = match self.config.scaler_policy {
            ScalerFitPolicy::FullWindow => set.len(),
            ScalerFitPolicy::TrainOnly => train_rows,
        };
        let normalizers = NormalizerPair {
            features: NormalizerState::fit(&rows[..fit_rows])?,
            target: NormalizerState::fit_values(&set.targets[..fit_rows])?,
        };

        let scaled_x = rows
            .iter()
            .map(|row| normalizers.features.transform(row))
            .collect::<Result<Vec<_>, _>>()?;
        let scaled_y = set
            .targets
            .iter()
            .map(|y| normalizers.target.transform_value(*y))
            .collect::<Result<Vec<_>, _>>()?;

        let model = self
            .regressor
            .fit(&scaled_x[..train_rows], &scaled_y[..train_rows])?;

        let predictions = model
            .predict(&scaled_x[train_rows..])?
            .into_iter()
            .map(|p| normalizers.target.inverse_value(p))
            .collect::<Result<Vec<_>, _>>()?;
        let metrics = EvaluationMetrics::compute(&set.targets[train_rows..], &predictions);

        info!(
            "{}: trained on {} rows, tested on {} | MAE={:.4} RMSE={:.4} MAPE={}",
            symbol,
            train_rows,
            test_rows,
            metrics.mae,
            metrics.rmse,
            metrics
                .mape
                .map_or_else(|| "n/a".to_string(), |m| format!("{:.2}%", m))
        );

        let bundle = ModelArtifactBundle::new(
            symbol,
            dataset,
            self.config.scaler_policy,
            model,
            normalizers,
            Some(metrics.clone()),
            set.len(),
        )
        .map_err(ArtifactError::from)?;

        Ok(TrainingReport {
            symbol: symbol.to_string(),
            rows: set.len(),
            train_rows,
            test_rows,
            metrics,
            bundle,
        })
    }

    /// Fits `entry` and persists the bundle. A failed fit leaves any
    /// previously stored bundle untouched.
    pub fn train_and_persist(
        &self,
        entry: &SymbolEntry,
        records: &[TimeSeriesRecord],
        store: &ArtifactStore,
    ) -> Result<TrainingReport, TrainingError> {
        let mut report = self.fit(&entry.key, &entry.dataset, records)?;
        report.bundle = store.save(entry, report.bundle)?;
        Ok(report)
    }

    /// Reads the dataset of `entry` and trains it.
    pub fn train_symbol(
        &self,
        entry: &SymbolEntry,
        datasets: &DatasetRepository,
        store: &ArtifactStore,
    ) -> Result<TrainingReport, TrainingError> {
        let path = datasets.locate(entry)?;
        info!("{}: loading dataset {:?}", entry.key, path);
        let records = read_records(&path)?;
        self.train_and_persist(entry, &records, store)
    }
}

/// Trains every entry, isolating failures per symbol.
///
/// Results come back in `entries` order. With `parallel`, symbols are
/// trained on the rayon pool; each writes only its own artifact.
pub fn train_symbols(
    pipeline: &TrainingPipeline,
    entries: &[SymbolEntry],
    datasets: &DatasetRepository,
    store: &ArtifactStore,
    parallel: bool,
) -> Vec<(String, Result<TrainingReport, TrainingError>)> {
    let run = |entry: &SymbolEntry| {
        let result = pipeline.train_symbol(entry, datasets, store);
        if let Err(e) = &result {
            error!("{}: training failed: {}", entry.key, e);
        }
        (entry.key.clone(), result)
    };

    if parallel {
        entries.par_iter().map(run).collect()
    } else {
        entries.iter().map(run).collect()
    }
}
