//! Aiken's V point estimator and its Wald-type confidence interval.
//!
//! Both functions are pure: they validate their inputs up front, never
//! touch shared state, and always produce the same output for the same
//! input. All rating arithmetic runs at full f64 precision; rounding is
//! the report layer's job.

use thiserror::Error;

use crate::aiken::quantile::normal_quantile;

/// Validation failure in the estimation core.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AikenError {
    /// The rating collection for an item is empty.
    #[error("rating set is empty")]
    EmptyRatings,

    /// The ordinal scale has fewer than two categories.
    #[error("scale must have at least 2 categories, got {k}")]
    TooFewCategories { k: u32 },

    /// A rating falls outside the scale range.
    #[error("rating {value} outside scale range [1, {k}]")]
    RatingOutOfRange { value: u32, k: u32 },

    /// A point estimate handed to the interval is outside [0, 1].
    #[error("point estimate {v} outside [0, 1]")]
    EstimateOutOfRange { v: f64 },

    /// The rater count is zero.
    #[error("rater count must be at least 1")]
    NoRaters,

    /// The confidence level is outside the open unit interval.
    #[error("confidence level {confidence} outside (0, 1)")]
    InvalidConfidence { confidence: f64 },
}

/// Compute Aiken's V for one item.
///
/// `values` holds one rating per rater, each in `[1, k]`. The coefficient
/// is the rating mass above the scale minimum, normalized by the maximum
/// attainable mass:
///
/// ```text
/// V = sum(value - 1) / (N * (k - 1))
/// ```
///
/// V is 0 when every rater chose the minimum and 1 when every rater chose
/// the maximum.
pub fn aiken_v(values: &[u32], k: u32) -> Result<f64, AikenError> {
    if k < 2 {
        return Err(AikenError::TooFewCategories { k });
    }
    if values.is_empty() {
        return Err(AikenError::EmptyRatings);
    }
    if let Some(&value) = values.iter().find(|&&v| v < 1 || v > k) {
        return Err(AikenError::RatingOutOfRange { value, k });
    }

    let s: u64 = values.iter().map(|&v| u64::from(v - 1)).sum();
    let n = values.len() as f64;

    Ok(s as f64 / (n * f64::from(k - 1)))
}

/// Compute a two-sided confidence interval for Aiken's V.
///
/// Uses the score-style normal approximation to the proportion underlying
/// V, with `n` raters and `k` scale categories:
///
/// ```text
/// z = quantile(1 - (1 - confidence) / 2)
/// s = sqrt(4nkV(1 - V) + z^2)
/// L = (2nkV + z^2 - z*s) / (2(nk + z^2))
/// U = (2nkV + z^2 + z*s) / (2(nk + z^2))
/// ```
///
/// Bounds are clamped to [0, 1] so floating-point residue can never push
/// them outside the coefficient's domain. V = 0 and V = 1 are valid
/// boundary inputs, not failures: the sqrt term collapses to `z` and the
/// interval stays well defined.
pub fn confidence_interval(
    v: f64,
    n: usize,
    k: u32,
    confidence: f64,
) -> Result<(f64, f64), AikenError> {
    if !(0.0..=1.0).contains(&v) {
        return Err(AikenError::EstimateOutOfRange { v });
    }
    if n < 1 {
        return Err(AikenError::NoRaters);
    }
    if k < 2 {
        return Err(AikenError::TooFewCategories { k });
    }
    if confidence <= 0.0 || confidence >= 1.0 {
        return Err(AikenError::InvalidConfidence { confidence });
    }

    let z = normal_quantile(1.0 - (1.0 - confidence) / 2.0);
    let nk = n as f64 * f64::from(k);

    let sqrt_term = (4.0 * nk * v * (1.0 - v) + z * z).sqrt();
    let denominator = 2.0 * (nk + z * z);

    let lower = (2.0 * nk * v + z * z - z * sqrt_term) / denominator;
    let upper = (2.0 * nk * v + z * z + z * sqrt_term) / denominator;

    Ok((lower.max(0.0), upper.min(1.0)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extremes() {
        // All minimal ratings pin V to 0, all maximal to 1
        assert_eq!(aiken_v(&[1, 1, 1, 1], 4).unwrap(), 0.0);
        assert_eq!(aiken_v(&[4, 4, 4, 4], 4).unwrap(), 1.0);
        assert_eq!(aiken_v(&[5, 5], 5).unwrap(), 1.0);
    }

    #[test]
    fn test_known_value() {
        // [4,4,3,4] on a 4-point scale: sum(value-1) = 11, N(k-1) = 12
        let v = aiken_v(&[4, 4, 3, 4], 4).unwrap();
        assert!((v - 11.0 / 12.0).abs() < 1e-12);
    }

    #[test]
    fn test_range_property() {
        let cases: &[(&[u32], u32)] = &[
            (&[1, 2, 3, 4], 4),
            (&[2, 2, 2], 5),
            (&[1], 2),
            (&[3, 1, 4, 1, 5], 5),
        ];
        for (values, k) in cases {
            let v = aiken_v(values, *k).unwrap();
            assert!((0.0..=1.0).contains(&v), "V={} out of range", v);
        }
    }

    #[test]
    fn test_monotonicity() {
        // Raising any single rating never decreases V
        let base = [3, 2, 4, 1];
        let v0 = aiken_v(&base, 4).unwrap();
        for i in 0..base.len() {
            let mut bumped = base;
            if bumped[i] < 4 {
                bumped[i] += 1;
                let v1 = aiken_v(&bumped, 4).unwrap();
                assert!(v1 > v0);
            }
        }
    }

    #[test]
    fn test_empty_ratings_rejected() {
        assert_eq!(aiken_v(&[], 4), Err(AikenError::EmptyRatings));
    }

    #[test]
    fn test_degenerate_scale_rejected() {
        assert_eq!(aiken_v(&[1, 1], 1), Err(AikenError::TooFewCategories { k: 1 }));
        assert_eq!(aiken_v(&[1], 0), Err(AikenError::TooFewCategories { k: 0 }));
    }

    #[test]
    fn test_out_of_range_rating_rejected() {
        assert_eq!(
            aiken_v(&[2, 5, 3], 4),
            Err(AikenError::RatingOutOfRange { value: 5, k: 4 })
        );
        assert_eq!(
            aiken_v(&[0, 2], 4),
            Err(AikenError::RatingOutOfRange { value: 0, k: 4 })
        );
    }

    #[test]
    fn test_idempotence() {
        let a = aiken_v(&[4, 4, 3, 4], 4).unwrap();
        let b = aiken_v(&[4, 4, 3, 4], 4).unwrap();
        assert_eq!(a.to_bits(), b.to_bits());

        let ci_a = confidence_interval(a, 4, 4, 0.95).unwrap();
        let ci_b = confidence_interval(b, 4, 4, 0.95).unwrap();
        assert_eq!(ci_a.0.to_bits(), ci_b.0.to_bits());
        assert_eq!(ci_a.1.to_bits(), ci_b.1.to_bits());
    }

    #[test]
    fn test_interval_known_value() {
        // V = 11/12 with n=4, k=4 at 95%:
        //   z = 1.959964, nk = 16
        //   s = sqrt(64 * 11/144 + z^2) = sqrt(8.730348) = 2.954716
        //   L = (29.333333 + 3.841459 - 5.791135) / 39.682918 = 0.690062
        //   U = (29.333333 + 3.841459 + 5.791135) / 39.682918 = 0.981934
        let v = aiken_v(&[4, 4, 3, 4], 4).unwrap();
        let (lower, upper) = confidence_interval(v, 4, 4, 0.95).unwrap();
        assert!((lower - 0.690).abs() < 5e-4, "lower = {}", lower);
        assert!((upper - 0.982).abs() < 5e-4, "upper = {}", upper);
    }

    #[test]
    fn test_interval_contains_estimate() {
        for &(v, n, k) in &[(0.5, 8, 4), (0.9, 10, 5), (0.2, 6, 3), (0.75, 20, 4)] {
            let (lower, upper) = confidence_interval(v, n, k, 0.95).unwrap();
            assert!(lower <= v && v <= upper, "V={} outside [{}, {}]", v, lower, upper);
        }
    }

    #[test]
    fn test_interval_width_grows_with_confidence() {
        let mut prev_width = 0.0;
        for confidence in [0.80, 0.90, 0.95, 0.99] {
            let (lower, upper) = confidence_interval(0.8, 7, 4, confidence).unwrap();
            let width = upper - lower;
            assert!(width >= prev_width);
            prev_width = width;
        }
    }

    #[test]
    fn test_interval_boundary_estimates() {
        // V = 0 and V = 1 are valid boundaries, not failures
        let (lower, upper) = confidence_interval(0.0, 5, 4, 0.95).unwrap();
        assert!(lower.abs() < 1e-12);
        assert!(upper > 0.01 && upper < 1.0);

        let (lower, upper) = confidence_interval(1.0, 5, 4, 0.95).unwrap();
        assert!(lower > 0.0 && lower < 0.99);
        assert!((upper - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_interval_bounds_stay_in_unit_range() {
        for n in 1..=30 {
            for &v in &[0.0, 0.01, 0.5, 0.99, 1.0] {
                let (lower, upper) = confidence_interval(v, n, 4, 0.999).unwrap();
                assert!((0.0..=1.0).contains(&lower));
                assert!((0.0..=1.0).contains(&upper));
                assert!(lower <= upper);
            }
        }
    }

    #[test]
    fn test_interval_precondition_failures() {
        assert_eq!(
            confidence_interval(1.2, 4, 4, 0.95),
            Err(AikenError::EstimateOutOfRange { v: 1.2 })
        );
        assert_eq!(
            confidence_interval(0.5, 0, 4, 0.95),
            Err(AikenError::NoRaters)
        );
        assert_eq!(
            confidence_interval(0.5, 4, 1, 0.95),
            Err(AikenError::TooFewCategories { k: 1 })
        );
        assert_eq!(
            confidence_interval(0.5, 4, 4, 1.0),
            Err(AikenError::InvalidConfidence { confidence: 1.0 })
        );
        assert_eq!(
            confidence_interval(0.5, 4, 4, 0.0),
            Err(AikenError::InvalidConfidence { confidence: 0.0 })
        );
    }
}
