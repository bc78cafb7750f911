//! Yahoo Finance chart API as a `LiveFeatureSource`.

use crate::config::UpstreamEnvConfig;
use crate::domain::errors::UpstreamDataError;
use crate::domain::ports::LiveFeatureSource;
use crate::domain::types::OhlcvBar;
use crate::infrastructure::http_client_factory::{
    HttpClientFactory, build_url_with_query, encode,
};
use async_trait::async_trait;
use chrono::DateTime;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use tracing::{debug, error};

#[derive(Debug, Deserialize)]
pub(crate) struct ChartResponse {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: Option<ChartMeta>,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    gmtoffset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteColumns>,
}

#[derive(Debug, Deserialize, Default)]
struct QuoteColumns {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

impl QuoteColumns {
    fn value(column: &[Option<f64>], idx: usize) -> Option<f64> {
        column.get(idx).copied().flatten().filter(|v| v.is_finite())
    }

    fn row_is_empty(&self, idx: usize) -> bool {
        [&self.open, &self.high, &self.low, &self.close, &self.volume]
            .iter()
            .all(|col| Self::value(col, idx).is_none())
    }
}

/// Extracts the most recent daily candle, rejecting incomplete data.
/// Fully empty trailing rows (a session with no prints yet) are skipped.
pub(crate) fn latest_bar(ticker: &str, response: ChartResponse) -> Result<OhlcvBar, UpstreamDataError> {
    let no_data = || UpstreamDataError::NoData {
        ticker: ticker.to_string(),
    };

    if let Some(err) = response.chart.error.filter(|e| !e.is_null()) {
        debug!("Upstream reported error for {}: {}", ticker, err);
        return Err(no_data());
    }
    let result = response
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(no_data)?;
    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();

    let idx = (0..result.timestamp.len())
        .rev()
        .find(|&i| !quote.row_is_empty(i))
        .ok_or_else(no_data)?;

    let field = |column: &[Option<f64>], name: &'static str| {
        QuoteColumns::value(column, idx).ok_or_else(|| UpstreamDataError::Incomplete {
            ticker: ticker.to_string(),
            field: name,
        })
    };
    let open = field(quote.open.as_slice(), "open")?;
    let high = field(quote.high.as_slice(), "high")?;
    let low = field(quote.low.as_slice(), "low")?;
    let volume = field(quote.volume.as_slice(), "volume")?;
    let close = field(quote.close.as_slice(), "close")?;

    let offset = result.meta.and_then(|m| m.gmtoffset).unwrap_or(0);
    let date = DateTime::from_timestamp(result.timestamp[idx] + offset, 0)
        .map(|dt| dt.date_naive())
        .ok_or_else(|| UpstreamDataError::Incomplete {
            ticker: ticker.to_string(),
            field: "timestamp",
        })?;

    Ok(OhlcvBar {
        date,
        open,
        high,
        low,
        close,
        volume,
    })
}

pub struct YahooFinanceSource {
    client: ClientWithMiddleware,
    base_url: String,
}

impl YahooFinanceSource {
    pub fn new(config: &UpstreamEnvConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: HttpClientFactory::create_client(config.timeout(), config.max_retries)?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl LiveFeatureSource for YahooFinanceSource {
    async fn fetch(&self, ticker: &str) -> Result<OhlcvBar, UpstreamDataError> {
        let transport = |reason: String| UpstreamDataError::Transport {
            ticker: ticker.to_string(),
            reason,
        };

        let url = build_url_with_query(
            &format!("{}/{}", self.base_url, encode(ticker)),
            &[("range", "5d"), ("interval", "1d")],
        );
        debug!("Fetching live candle: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| transport(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(UpstreamDataError::NoData {
                ticker: ticker.to_string(),
            });
        }
        if !response.status().is_success() {
            let status = response.status();
            let err = response.text().await.unwrap_or_default();
            error!("Live candle fetch failed for {}: {} {}", ticker, status, err);
            return Err(transport(format!("HTTP {}", status)));
        }

        let body: ChartResponse = response
            .json()
            .await
            .map_err(|e| transport(format!("invalid response body: {}", e)))?;
        latest_bar(ticker, body)
    }

    fn name(&self) -> &str {
        "Yahoo Finance"
    }
}
