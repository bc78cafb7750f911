//! Volatility-based confidence heuristic.
//!
//! Not a statistical interval: wider intraday ranges relative to the close
//! lower the score, which is bounded to [75, 98].

pub const CONFIDENCE_CEILING: f64 = 98.0;
pub const CONFIDENCE_FLOOR: f64 = 75.0;
const VOLATILITY_PENALTY: f64 = 40.0;
const EPSILON: f64 = 1e-6;

pub fn confidence_score(high: f64, low: f64, close: f64) -> f64 {
    let spread = EPSILON.max(high - low);
    let rel_volatility = (spread / EPSILON.max(close)).min(1.0);
    (CONFIDENCE_CEILING - rel_volatility * VOLATILITY_PENALTY).clamp(CONFIDENCE_FLOOR, CONFIDENCE_CEILING)
}

/// Two-decimal rounding used in API responses
pub fn round_confidence(score: f64) -> f64 {
    (score * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moderate_volatility() {
        // spread 10 on close 100 -> 0.1 relative volatility
        let score = confidence_score(105.0, 95.0, 100.0);
        assert!((score - 94.0).abs() < 1e-9);
    }

    #[test]
    fn test_volatility_capped_at_floor() {
        let score = confidence_score(200.0, 50.0, 100.0);
        assert_eq!(score, 75.0);
    }

    #[test]
    fn test_flat_candle_near_ceiling() {
        let score = confidence_score(100.0, 100.0, 100.0);
        assert!(score <= CONFIDENCE_CEILING);
        assert!(score > 97.99);
    }

    #[test]
    fn test_zero_close_does_not_divide_by_zero() {
        let score = confidence_score(1.0, 0.5, 0.0);
        assert_eq!(score, CONFIDENCE_FLOOR);
    }

    #[test]
    fn test_rounding() {
        assert_eq!(round_confidence(93.456), 93.46);
    }
}
