use crate::domain::errors::DataError;
use crate::domain::ml::feature_registry::{FEATURE_COUNT, FEATURE_NAMES, FeatureVector};
use crate::domain::types::TimeSeriesRecord;
use chrono::NaiveDate;
use tracing::debug;

/// Index-aligned features and targets. The target is the same row's close.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSet {
    pub dates: Vec<NaiveDate>,
    pub features: Vec<FeatureVector>,
    pub targets: Vec<f64>,
}

impl FeatureSet {
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// Extracts the (open, high, low, volume) -> close columns from raw records.
pub struct FeatureSetBuilder {
    cutoff: NaiveDate,
}

impl FeatureSetBuilder {
    /// Rows dated on or before `cutoff` are dropped.
    pub fn new(cutoff: NaiveDate) -> Self {
        Self { cutoff }
    }

    pub fn build(&self, records: &[TimeSeriesRecord]) -> Result<FeatureSet, DataError> {
        let mut window: Vec<&TimeSeriesRecord> =
            records.iter().filter(|r| r.date > self.cutoff).collect();
        if window.is_empty() {
            return Err(DataError::EmptyAfterCutoff {
                cutoff: self.cutoff,
            });
        }
        window.sort_by_key(|r| r.date);

        let raw: Vec<[Option<f64>; FEATURE_COUNT]> = window
            .iter()
            .map(|r| [r.open, r.high, r.low, r.volume].map(|v| v.filter(|x| x.is_finite())))
            .collect();

        let mut means = [0.0; FEATURE_COUNT];
        for (col, mean) in means.iter_mut().enumerate() {
            let present: Vec<f64> = raw.iter().filter_map(|row| row[col]).collect();
            if present.len() == raw.len() {
                continue;
            }
            if present.is_empty() {
                return Err(DataError::EmptyColumn {
                    column: FEATURE_NAMES[col],
                });
            }
            *mean = present.iter().sum::<f64>() / present.len() as f64;
            debug!(
                "Imputing {} missing '{}' values with mean {:.4}",
                raw.len() - present.len(),
                FEATURE_NAMES[col],
                mean
            );
        }

        let features = raw
            .iter()
            .map(|row| FeatureVector(std::array::from_fn(|col| row[col].unwrap_or(means[col]))))
            .collect();

        let targets = window
            .iter()
            .map(|r| {
                r.close
                    .filter(|c| c.is_finite())
                    .ok_or(DataError::MissingTarget { date: r.date })
            })
            .collect::<Result<Vec<f64>, DataError>>()?;

        Ok(FeatureSet {
            dates: window.iter().map(|r| r.date).collect(),
            features,
            targets,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn builder() -> FeatureSetBuilder {
        FeatureSetBuilder::new(date(2010, 1, 1))
    }

    #[test]
    fn test_cutoff_is_exclusive_and_rows_sorted() {
        let records = vec![
            TimeSeriesRecord::complete(date(2010, 1, 5), 3.0, 3.5, 2.5, 3.2, 300.0),
            TimeSeriesRecord::complete(date(2010, 1, 1), 9.0, 9.0, 9.0, 9.0, 900.0),
            TimeSeriesRecord::complete(date(2010, 1, 4), 2.0, 2.5, 1.5, 2.2, 200.0),
        ];

        let set = builder().build(&records).unwrap();
        assert_eq!(set.dates, vec![date(2010, 1, 4), date(2010, 1, 5)]);
        assert_eq!(set.features[0].as_slice(), &[2.0, 2.5, 1.5, 200.0]);
        // Same-row close, no lag
        assert_eq!(set.targets, vec![2.2, 3.2]);
    }

    #[test]
    fn test_empty_after_cutoff() {
        let records = vec![TimeSeriesRecord::complete(date(2009, 6, 1), 1.0, 1.0, 1.0, 1.0, 1.0)];
        assert!(matches!(
            builder().build(&records),
            Err(DataError::EmptyAfterCutoff { .. })
        ));
        assert!(builder().build(&[]).is_err());
    }

    #[test]
    fn test_missing_feature_filled_with_window_mean() {
        let mut gap = TimeSeriesRecord::complete(date(2011, 1, 4), 0.0, 12.0, 8.0, 10.0, 500.0);
        gap.open = None;
        gap.volume = Some(f64::NAN);
        let records = vec![
            TimeSeriesRecord::complete(date(2011, 1, 3), 10.0, 11.0, 9.0, 10.5, 100.0),
            gap,
            TimeSeriesRecord::complete(date(2011, 1, 5), 14.0, 15.0, 13.0, 14.5, 300.0),
            // Outside the window, must not influence the mean
            TimeSeriesRecord::complete(date(2005, 1, 5), 1000.0, 1000.0, 1000.0, 1000.0, 1e9),
        ];

        let set = builder().build(&records).unwrap();
        assert_eq!(set.features[1].as_slice(), &[12.0, 12.0, 8.0, 200.0]);
    }

    #[test]
    fn test_clean_series_is_untouched() {
        let records: Vec<TimeSeriesRecord> = (1..=5)
            .map(|d| {
                let x = d as f64;
                TimeSeriesRecord::complete(date(2012, 2, d), x, x + 1.0, x - 0.5, x + 0.2, 1000.0 * x)
            })
            .collect();

        let set = builder().build(&records).unwrap();
        for (record, fv) in records.iter().zip(&set.features) {
            assert_eq!(
                fv.as_slice(),
                &[
                    record.open.unwrap(),
                    record.high.unwrap(),
                    record.low.unwrap(),
                    record.volume.unwrap()
                ]
            );
        }
        let closes: Vec<f64> = records.iter().map(|r| r.close.unwrap()).collect();
        assert_eq!(set.targets, closes);
    }

    #[test]
    fn test_all_missing_column_fails() {
        let mut a = TimeSeriesRecord::complete(date(2012, 1, 2), 1.0, 1.0, 1.0, 1.0, 1.0);
        let mut b = TimeSeriesRecord::complete(date(2012, 1, 3), 1.0, 1.0, 1.0, 1.0, 1.0);
        a.low = None;
        b.low = None;
        assert!(matches!(
            builder().build(&[a, b]),
            Err(DataError::EmptyColumn { column: "low" })
        ));
    }

    #[test]
    fn test_missing_close_is_not_imputed() {
        let mut r = TimeSeriesRecord::complete(date(2012, 1, 2), 1.0, 1.0, 1.0, 1.0, 1.0);
        r.close = None;
        assert!(matches!(
            builder().build(&[r]),
            Err(DataError::MissingTarget { .. })
        ));
    }
}
