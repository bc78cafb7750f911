use crate::domain::errors::UpstreamDataError;
use crate::domain::types::OhlcvBar;
use async_trait::async_trait;

/// Source of the most recent daily candle for a ticker.
///
/// Implementations must return a complete bar or an error; they never
/// impute missing columns.
#[async_trait]
pub trait LiveFeatureSource: Send + Sync {
    async fn fetch(&self, ticker: &str) -> Result<OhlcvBar, UpstreamDataError>;

    /// Name used in logs
    fn name(&self) -> &str;
}
