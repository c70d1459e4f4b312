use crate::models::{Recommendation, ScoreResult};

/// Lower bound of the `excellent` band
pub const EXCELLENT_THRESHOLD: f64 = 80.0;
/// Lower bound of the `good` band
pub const GOOD_THRESHOLD: f64 = 65.0;
/// Lower bound of the `moderate` band
pub const MODERATE_THRESHOLD: f64 = 45.0;

/// Clamp a raw model output to [0, 100] and round to 2 decimal places
///
/// Rounding applies to the exact value of the input, half away from zero:
/// 72.125 becomes 72.13, while the literal 44.995 (stored just below the
/// midpoint) becomes 44.99.
#[inline]
pub fn normalize(raw_score: f64) -> f64 {
    let clamped = raw_score.clamp(0.0, 100.0);
    let scaled = clamped * 100.0;
    let mut rounded = scaled.round();

    // The product can land exactly on .5 when the true value is just below
    // it; the fused residual is the exact rounding error of the product.
    if scaled.fract() == 0.5 && clamped.mul_add(100.0, -scaled) < 0.0 {
        rounded -= 1.0;
    }

    rounded / 100.0
}

/// Map a normalized score to its recommendation band
///
/// Bands are inclusive on their lower bound.
#[inline]
pub fn classify(score: f64) -> Recommendation {
    if score >= EXCELLENT_THRESHOLD {
        Recommendation::Excellent
    } else if score >= GOOD_THRESHOLD {
        Recommendation::Good
    } else if score >= MODERATE_THRESHOLD {
        Recommendation::Moderate
    } else {
        Recommendation::Low
    }
}

/// Normalize then classify a raw prediction
#[inline]
pub fn to_score_result(raw_score: f64) -> ScoreResult {
    let compatibility_score = normalize(raw_score);
    ScoreResult {
        compatibility_score,
        recommendation: classify(compatibility_score),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_clamps() {
        assert_eq!(normalize(-12.5), 0.0);
        assert_eq!(normalize(130.0), 100.0);
        assert_eq!(normalize(100.0), 100.0);
        assert_eq!(normalize(0.0), 0.0);
    }

    #[test]
    fn test_normalize_rounds_half_away_from_zero() {
        assert_eq!(normalize(72.125), 72.13);
        assert_eq!(normalize(50.005_000_1), 50.01);
        assert_eq!(normalize(33.3333), 33.33);
    }

    #[test]
    fn test_normalize_rounds_the_stored_value() {
        // Both literals are stored just below their midpoints
        assert_eq!(normalize(0.015), 0.01);
        assert_eq!(normalize(44.995), 44.99);
        assert_eq!(normalize(44.995_000_1), 45.0);
    }

    #[test]
    fn test_rounding_does_not_lift_across_band_at_45() {
        let result = to_score_result(44.995);
        assert_eq!(result.compatibility_score, 44.99);
        assert_eq!(result.recommendation, Recommendation::Low);
    }

    #[test]
    fn test_classify_boundaries() {
        assert_eq!(classify(79.99), Recommendation::Good);
        assert_eq!(classify(80.0), Recommendation::Excellent);
        assert_eq!(classify(64.99), Recommendation::Moderate);
        assert_eq!(classify(65.0), Recommendation::Good);
        assert_eq!(classify(44.99), Recommendation::Low);
        assert_eq!(classify(45.0), Recommendation::Moderate);
    }

    #[test]
    fn test_rounding_can_lift_into_next_band() {
        // 79.996 rounds to 80.00, which is excellent
        let result = to_score_result(79.996);
        assert_eq!(result.compatibility_score, 80.0);
        assert_eq!(result.recommendation, Recommendation::Excellent);
    }
}
