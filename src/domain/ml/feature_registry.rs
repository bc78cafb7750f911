use crate::domain::types::OhlcvBar;

/// Ordered list of feature names.
/// This order MUST match between training and serving.
/// Any change here is a breaking change for persisted bundles.
pub const FEATURE_NAMES: &[&str] = &["open", "high", "low", "volume"];

pub const FEATURE_COUNT: usize = 4;

/// Model input in registry order: open, high, low, volume.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector(pub [f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn new(open: f64, high: f64, low: f64, volume: f64) -> Self {
        Self([open, high, low, volume])
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

/// Converts a live candle into the trained column order.
pub fn bar_to_features(bar: &OhlcvBar) -> FeatureVector {
    FeatureVector::new(bar.open, bar.high, bar.low, bar.volume)
}

/// True when a persisted feature list matches the compiled order.
pub fn matches_registry(names: &[String]) -> bool {
    names.len() == FEATURE_NAMES.len() && names.iter().zip(FEATURE_NAMES).all(|(a, b)| a == b)
}

pub fn registry_names() -> Vec<String> {
    FEATURE_NAMES.iter().map(|n| n.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_feature_vector_length() {
        assert_eq!(FEATURE_NAMES.len(), FEATURE_COUNT);
    }

    #[test]
    fn test_feature_consistency() {
        let bar = OhlcvBar {
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            open: 1.0,
            high: 2.0,
            low: 3.0,
            close: 9.0,
            volume: 4.0,
        };

        let vec = bar_to_features(&bar);
        // Close is the target, never a feature
        assert_eq!(vec.as_slice(), &[1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_registry_match() {
        assert!(matches_registry(&registry_names()));

        let swapped: Vec<String> = ["high", "open", "low", "volume"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert!(!matches_registry(&swapped));
    }
}
