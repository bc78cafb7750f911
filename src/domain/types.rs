use crate::domain::errors::UpstreamDataError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One daily row of a training dataset.
///
/// Numeric cells are optional: training imputes missing features, so gaps
/// are carried through ingestion rather than rejected there.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesRecord {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<f64>,
}

impl TimeSeriesRecord {
    /// A record with every column present
    pub fn complete(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            date,
            open: Some(open),
            high: Some(high),
            low: Some(low),
            close: Some(close),
            volume: Some(volume),
        }
    }
}

/// A complete live daily candle, as returned by a `LiveFeatureSource`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OhlcvBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl OhlcvBar {
    /// Rejects a candle with any non-finite column, naming the first one.
    pub fn validate(&self, ticker: &str) -> Result<(), UpstreamDataError> {
        let columns = [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("volume", self.volume),
            ("close", self.close),
        ];
        match columns.iter().find(|(_, v)| !v.is_finite()) {
            Some(&(field, _)) => Err(UpstreamDataError::Incomplete {
                ticker: ticker.to_string(),
                field,
            }),
            None => Ok(()),
        }
    }
}

/// Point of the price history shown next to a prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub time: String,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResult {
    pub symbol: String,
    pub name: String,
    pub current_price: f64,
    pub prediction: f64,
    /// Volatility heuristic in [75, 98], rounded to two decimals
    pub confidence: f64,
    pub chart_data: Vec<ChartPoint>,
    pub model_version: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub symbol: String,
    pub name: String,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub symbol: String,
    pub data: Vec<ChartPoint>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar() -> OhlcvBar {
        OhlcvBar {
            date: NaiveDate::from_ymd_opt(2024, 6, 4).unwrap(),
            open: 194.6,
            high: 195.3,
            low: 193.0,
            close: 194.3,
            volume: 4.1e7,
        }
    }

    #[test]
    fn test_complete_bar_is_valid() {
        assert!(bar().validate("AAPL").is_ok());
    }

    #[test]
    fn test_first_non_finite_column_is_named() {
        let mut b = bar();
        b.volume = f64::NAN;
        b.close = f64::INFINITY;
        assert!(matches!(
            b.validate("AAPL"),
            Err(UpstreamDataError::Incomplete { field: "volume", .. })
        ));
    }
}
