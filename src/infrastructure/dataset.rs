//! Historical OHLCV datasets stored as one CSV file per symbol.

use crate::config::SymbolEntry;
use crate::domain::errors::{DataError, NotFoundError};
use crate::domain::types::{ChartPoint, TimeSeriesRecord};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "Date", alias = "date")]
    date: String,
    #[serde(rename = "Open", alias = "open", default, deserialize_with = "csv::invalid_option")]
    open: Option<f64>,
    #[serde(rename = "High", alias = "high", default, deserialize_with = "csv::invalid_option")]
    high: Option<f64>,
    #[serde(rename = "Low", alias = "low", default, deserialize_with = "csv::invalid_option")]
    low: Option<f64>,
    #[serde(rename = "Close", alias = "close", default, deserialize_with = "csv::invalid_option")]
    close: Option<f64>,
    #[serde(rename = "Volume", alias = "volume", default, deserialize_with = "csv::invalid_option")]
    volume: Option<f64>,
}

/// Accepts `YYYY-MM-DD`, timestamped exports (`2010-01-04 00:00:00-05:00`,
/// RFC 3339) and `MM/DD/YYYY`. Timestamps keep their local calendar day.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%:z") {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.date());
    }
    NaiveDate::parse_from_str(raw, "%m/%d/%Y").ok()
}

/// Reads every row of a dataset file, in file order.
/// Empty or unparsable numeric cells become `None`.
pub fn read_records(path: &Path) -> Result<Vec<TimeSeriesRecord>, DataError> {
    let file = File::open(path).map_err(|e| DataError::Read {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let mut rdr = csv::Reader::from_reader(BufReader::new(file));

    let mut records = Vec::new();
    for (idx, result) in rdr.deserialize::<CsvRow>().enumerate() {
        // Header is line 1
        let line = idx as u64 + 2;
        let row = result.map_err(|e| DataError::InvalidRow {
            path: path.to_path_buf(),
            line,
            reason: e.to_string(),
        })?;
        let date = parse_date(&row.date).ok_or_else(|| DataError::InvalidRow {
            path: path.to_path_buf(),
            line,
            reason: format!("unparsable date '{}'", row.date),
        })?;

        records.push(TimeSeriesRecord {
            date,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume,
        });
    }

    debug!("Read {} rows from {:?}", records.len(), path);
    Ok(records)
}

/// The most recent `limit` closes, oldest first. Rows without a close are skipped.
pub fn chart_points(records: &[TimeSeriesRecord], limit: usize) -> Vec<ChartPoint> {
    let mut priced: Vec<(NaiveDate, f64)> = records
        .iter()
        .filter_map(|r| r.close.filter(|c| c.is_finite()).map(|c| (r.date, c)))
        .collect();
    priced.sort_by_key(|(date, _)| *date);

    let skip = priced.len().saturating_sub(limit);
    priced
        .into_iter()
        .skip(skip)
        .map(|(date, price)| ChartPoint {
            time: date.format("%Y-%m-%d").to_string(),
            price,
        })
        .collect()
}

/// Locates per-symbol dataset files under one directory.
#[derive(Debug, Clone)]
pub struct DatasetRepository {
    data_dir: PathBuf,
}

impl DatasetRepository {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn path_for(&self, entry: &SymbolEntry) -> PathBuf {
        self.data_dir.join(&entry.dataset)
    }

    pub fn locate(&self, entry: &SymbolEntry) -> Result<PathBuf, NotFoundError> {
        let path = self.path_for(entry);
        if !path.exists() {
            return Err(NotFoundError::Dataset {
                symbol: entry.key.clone(),
                path,
            });
        }
        Ok(path)
    }
}
