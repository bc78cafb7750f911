//! Read-only serving over persisted bundles.
//!
//! Every request resolves the symbol before touching the filesystem or the
//! network, so an unsupported symbol never costs any I/O.

use crate::config::{SymbolEntry, SymbolRegistry};
use crate::domain::errors::{PredictionError, UpstreamDataError};
use crate::domain::ml::confidence::{confidence_score, round_confidence};
use crate::domain::ml::feature_registry::bar_to_features;
use crate::domain::ports::LiveFeatureSource;
use crate::domain::types::{ChartSeries, OhlcvBar, PredictionResult, PriceQuote};
use crate::infrastructure::artifact_store::ArtifactStore;
use crate::infrastructure::dataset::{DatasetRepository, chart_points, read_records};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub struct InferenceService {
    registry: Arc<SymbolRegistry>,
    store: ArtifactStore,
    datasets: DatasetRepository,
    source: Arc<dyn LiveFeatureSource>,
    chart_window: usize,
    fetch_timeout: Duration,
}

impl InferenceService {
    pub fn new(
        registry: Arc<SymbolRegistry>,
        store: ArtifactStore,
        datasets: DatasetRepository,
        source: Arc<dyn LiveFeatureSource>,
        chart_window: usize,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            registry,
            store,
            datasets,
            source,
            chart_window,
            fetch_timeout,
        }
    }

    pub fn registry(&self) -> &SymbolRegistry {
        &self.registry
    }

    /// Predicts the next close for `symbol` from its latest live candle.
    pub async fn predict(&self, symbol: &str) -> Result<PredictionResult, PredictionError> {
        let entry = self.registry.resolve(symbol)?;

        let bundle = self.store.load(entry)?;
        let dataset = self.datasets.locate(entry)?;

        let bar = self.fetch_live(entry).await?;
        let features = bar_to_features(&bar);
        let scaled = bundle.normalizers.features.transform(features.as_slice())?;
        let scaled_prediction = bundle.model.predict_row(&scaled)?;
        let prediction = bundle.normalizers.target.inverse_value(scaled_prediction)?;

        let confidence = round_confidence(confidence_score(bar.high, bar.low, bar.close));
        let records = read_records(&dataset)?;
        let chart_data = chart_points(&records, self.chart_window);

        info!(
            "{} v{}: close={:.4} -> prediction={:.4} (confidence {:.2})",
            entry.key, bundle.version, bar.close, prediction, confidence
        );

        Ok(PredictionResult {
            symbol: entry.key.clone(),
            name: entry.name.clone(),
            current_price: bar.close,
            prediction,
            confidence,
            chart_data,
            model_version: bundle.version,
        })
    }

    /// Latest live close for `symbol`.
    pub async fn price(&self, symbol: &str) -> Result<PriceQuote, PredictionError> {
        let entry = self.registry.resolve(symbol)?;
        let bar = self.fetch_live(entry).await?;
        Ok(PriceQuote {
            symbol: entry.key.clone(),
            name: entry.name.clone(),
            price: bar.close,
        })
    }

    /// The most recent `limit` historical closes for `symbol`.
    pub fn chart(&self, symbol: &str, limit: usize) -> Result<ChartSeries, PredictionError> {
        let entry = self.registry.resolve(symbol)?;
        let path = self.datasets.locate(entry)?;
        let records = read_records(&path)?;
        Ok(ChartSeries {
            symbol: entry.key.clone(),
            data: chart_points(&records, limit),
        })
    }

    async fn fetch_live(&self, entry: &SymbolEntry) -> Result<OhlcvBar, UpstreamDataError> {
        debug!("Fetching {} from {}", entry.ticker, self.source.name());
        match tokio::time::timeout(self.fetch_timeout, self.source.fetch(&entry.ticker)).await {
            Ok(result) => {
                let bar = result?;
                bar.validate(&entry.ticker)?;
                Ok(bar)
            }
            Err(_) => {
                warn!(
                    "{} did not answer for {} within {:?}",
                    self.source.name(),
                    entry.ticker,
                    self.fetch_timeout
                );
                Err(UpstreamDataError::Timeout {
                    ticker: entry.ticker.clone(),
                    duration_ms: self.fetch_timeout.as_millis() as u64,
                })
            }
        }
    }
}
