use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while turning raw training records into features and targets
#[derive(Debug, Error)]
pub enum DataError {
    #[error("No rows left after cutoff {cutoff}")]
    EmptyAfterCutoff { cutoff: NaiveDate },

    #[error("Column '{column}' has no usable values to impute from")]
    EmptyColumn { column: &'static str },

    #[error("Missing close price on {date}")]
    MissingTarget { date: NaiveDate },

    #[error("Degenerate split: {rows} rows give {train} train / {test} test samples")]
    DegenerateSplit {
        rows: usize,
        train: usize,
        test: usize,
    },

    #[error("Invalid row {line} in {path:?}: {reason}")]
    InvalidRow {
        path: PathBuf,
        line: u64,
        reason: String,
    },

    #[error("Failed to read dataset {path:?}: {reason}")]
    Read { path: PathBuf, reason: String },
}

/// A requested artifact or dataset is absent on disk
#[derive(Debug, Error)]
pub enum NotFoundError {
    #[error("Model unavailable for symbol {symbol} (no artifact at {path:?})")]
    Artifact { symbol: String, path: PathBuf },

    #[error("Dataset not found for symbol {symbol} at {path:?}")]
    Dataset { symbol: String, path: PathBuf },
}

/// Failures of the live market-data collaborator
#[derive(Debug, Error)]
pub enum UpstreamDataError {
    #[error("Upstream returned no data for {ticker}")]
    NoData { ticker: String },

    #[error("Incomplete OHLCV data for {ticker}: '{field}' missing or non-numeric")]
    Incomplete { ticker: String, field: &'static str },

    #[error("Upstream timeout after {duration_ms}ms for {ticker}")]
    Timeout { ticker: String, duration_ms: u64 },

    #[error("Upstream request failed for {ticker}: {reason}")]
    Transport { ticker: String, reason: String },
}

#[derive(Debug, Error)]
#[error("Unsupported symbol: {symbol}")]
pub struct UnsupportedSymbolError {
    pub symbol: String,
}

/// Errors from fitting or evaluating the regression model
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("Matrix creation failed: {0}")]
    Matrix(String),

    #[error("Training error: {0}")]
    Fit(String),

    #[error("Prediction failed: {0}")]
    Predict(String),

    #[error("Fitted model has non-finite parameters")]
    NonFinite,
}

/// Errors reading or writing artifact bundles
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error(transparent)]
    Missing(#[from] NotFoundError),

    #[error("Bundle for {found} cannot be stored or served as {expected}")]
    SymbolMismatch { expected: String, found: String },

    #[error("Corrupt artifact {path:?}: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    #[error("Artifact I/O failed for {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize artifact: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Aborts the training run of a single symbol
#[derive(Debug, Error)]
pub enum TrainingError {
    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    #[error(transparent)]
    NotFound(#[from] NotFoundError),
}

/// Serving failures, kept as distinct categories for the boundary to map
#[derive(Debug, Error)]
pub enum PredictionError {
    #[error(transparent)]
    UnsupportedSymbol(#[from] UnsupportedSymbolError),

    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    #[error(transparent)]
    UpstreamData(#[from] UpstreamDataError),

    #[error(transparent)]
    Artifact(ArtifactError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Data(#[from] DataError),
}

impl From<ArtifactError> for PredictionError {
    fn from(err: ArtifactError) -> Self {
        match err {
            ArtifactError::Missing(not_found) => PredictionError::NotFound(not_found),
            other => PredictionError::Artifact(other),
        }
    }
}
