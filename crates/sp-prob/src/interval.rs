//! Confidence intervals for binomial ratios `k / n`.
//!
//! All methods report the observed fraction `k / n` as the point estimate
//! (the posterior mode under a flat Beta(1, 1) prior) and return an interval
//! that contains it and stays inside `[0, 1]`.

use serde::{Deserialize, Serialize};
use sp_core::{Error, Result};
use statrs::distribution::{ContinuousCDF, Normal};

use crate::beta;

/// One-sigma (68.3%) coverage, the usual choice for efficiency plots.
pub const DEFAULT_CONFIDENCE_LEVEL: f64 = 0.683;

/// How to build the interval around `k / n`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntervalMethod {
    /// Shortest Bayesian credible interval on Beta(k+1, n-k+1).
    #[default]
    BayesianShortest,
    /// Central Clopper-Pearson (exact frequentist) interval.
    ClopperPearson,
    /// Wilson score interval.
    Wilson,
}

/// Point estimate with its asymmetric interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatioInterval {
    /// `k / n`
    pub point: f64,
    /// Lower bound, `0 <= lower <= point`.
    pub lower: f64,
    /// Upper bound, `point <= upper <= 1`.
    pub upper: f64,
}

impl RatioInterval {
    /// `point - lower`
    pub fn err_low(&self) -> f64 {
        self.point - self.lower
    }

    /// `upper - point`
    pub fn err_high(&self) -> f64 {
        self.upper - self.point
    }

    fn around(point: f64, lower: f64, upper: f64) -> Self {
        Self {
            point,
            lower: lower.clamp(0.0, 1.0).min(point),
            upper: upper.clamp(0.0, 1.0).max(point),
        }
    }
}

/// Interval for `pass` successes out of `total` trials at coverage `level`.
///
/// Returns `Ok(None)` when `total == 0`: the ratio is undefined and the caller
/// decides how to present it.
pub fn binomial_interval(
    pass: u64,
    total: u64,
    level: f64,
    method: IntervalMethod,
) -> Result<Option<RatioInterval>> {
    if pass > total {
        return Err(Error::Validation(format!(
            "pass must be <= total, got pass={} total={}",
            pass, total
        )));
    }
    if !level.is_finite() || level <= 0.0 || level >= 1.0 {
        return Err(Error::Validation(format!("level must be in (0, 1), got {}", level)));
    }
    if total == 0 {
        return Ok(None);
    }

    let k = pass as f64;
    let n = total as f64;
    let point = k / n;
    let (lower, upper) = match method {
        IntervalMethod::BayesianShortest => beta::shortest_interval(k + 1.0, n - k + 1.0, level)?,
        IntervalMethod::ClopperPearson => clopper_pearson(k, n, level)?,
        IntervalMethod::Wilson => wilson(k, n, level)?,
    };
    Ok(Some(RatioInterval::around(point, lower, upper)))
}

fn clopper_pearson(k: f64, n: f64, level: f64) -> Result<(f64, f64)> {
    let alpha = 1.0 - level;
    let lower = if k == 0.0 { 0.0 } else { beta::quantile(0.5 * alpha, k, n - k + 1.0)? };
    let upper = if k == n { 1.0 } else { beta::quantile(1.0 - 0.5 * alpha, k + 1.0, n - k)? };
    Ok((lower, upper))
}

fn wilson(k: f64, n: f64, level: f64) -> Result<(f64, f64)> {
    let std_normal = Normal::new(0.0, 1.0)
        .map_err(|e| Error::Computation(format!("standard normal: {}", e)))?;
    let z = std_normal.inverse_cdf(0.5 * (1.0 + level));
    let p = k / n;
    let z2 = z * z;
    let denom = 1.0 + z2 / n;
    let center = (p + z2 / (2.0 * n)) / denom;
    let half = z * (p * (1.0 - p) / n + z2 / (4.0 * n * n)).sqrt() / denom;
    Ok((center - half, center + half))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    const METHODS: [IntervalMethod; 3] =
        [IntervalMethod::BayesianShortest, IntervalMethod::ClopperPearson, IntervalMethod::Wilson];

    #[test]
    fn test_zero_total_is_undefined() {
        for m in METHODS {
            assert!(binomial_interval(0, 0, DEFAULT_CONFIDENCE_LEVEL, m).unwrap().is_none());
        }
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(binomial_interval(3, 2, 0.683, IntervalMethod::Wilson).is_err());
        assert!(binomial_interval(1, 2, 0.0, IntervalMethod::Wilson).is_err());
        assert!(binomial_interval(1, 2, f64::NAN, IntervalMethod::ClopperPearson).is_err());
    }

    #[test]
    fn test_zero_passes_have_positive_upper_bound() {
        for m in METHODS {
            let r = binomial_interval(0, 1, DEFAULT_CONFIDENCE_LEVEL, m).unwrap().unwrap();
            assert_eq!(r.point, 0.0);
            assert_eq!(r.lower, 0.0);
            assert!(r.upper > 0.0, "{:?}", m);
        }
    }

    #[test]
    fn test_bayesian_shortest_zero_of_one() {
        let r = binomial_interval(0, 1, 0.683, IntervalMethod::BayesianShortest).unwrap().unwrap();
        assert_abs_diff_eq!(r.upper, 1.0 - (1.0f64 - 0.683).sqrt(), epsilon = 1e-8);
        assert_abs_diff_eq!(r.err_high(), r.upper, epsilon = 1e-15);
        assert_eq!(r.err_low(), 0.0);
    }

    #[test]
    fn test_clopper_pearson_zero_of_ten() {
        let r = binomial_interval(0, 10, 0.683, IntervalMethod::ClopperPearson).unwrap().unwrap();
        let alpha: f64 = 1.0 - 0.683;
        assert_abs_diff_eq!(r.upper, 1.0 - (0.5 * alpha).powf(0.1), epsilon = 1e-8);
    }

    #[test]
    fn test_all_pass_reaches_one() {
        for m in [IntervalMethod::BayesianShortest, IntervalMethod::ClopperPearson] {
            let r = binomial_interval(7, 7, 0.683, m).unwrap().unwrap();
            assert_eq!(r.point, 1.0);
            assert_eq!(r.upper, 1.0);
            assert!(r.lower < 1.0);
        }
    }

    #[test]
    fn test_half_is_symmetric() {
        for m in METHODS {
            let r = binomial_interval(10, 20, 0.683, m).unwrap().unwrap();
            assert_abs_diff_eq!(r.err_low(), r.err_high(), epsilon = 1e-5);
        }
    }

    fn posterior_mass(pass: u64, total: u64, r: &RatioInterval) -> f64 {
        let (a, b) = ((pass + 1) as f64, (total - pass + 1) as f64);
        beta::cdf(r.upper, a, b).unwrap() - beta::cdf(r.lower, a, b).unwrap()
    }

    #[test]
    fn test_bayesian_mass_holds_for_large_and_extreme_counts() {
        for (pass, total) in [(3, 100_000), (99_999, 100_000), (500_000, 1_000_000), (1, 1_000)] {
            let r = binomial_interval(
                pass,
                total,
                DEFAULT_CONFIDENCE_LEVEL,
                IntervalMethod::BayesianShortest,
            )
            .unwrap()
            .unwrap();
            let mass = posterior_mass(pass, total, &r);
            assert_abs_diff_eq!(mass, DEFAULT_CONFIDENCE_LEVEL, epsilon = 1e-8);
            assert!(r.err_low() > 0.0 && r.err_high() > 0.0, "{}/{}: {:?}", pass, total, r);
        }
    }

    #[test]
    fn test_bayesian_matches_gaussian_limit() {
        // p = 0.5, n = 1e6: half-width ~ z * sqrt(p (1 - p) / n).
        let r = binomial_interval(500_000, 1_000_000, 0.683, IntervalMethod::BayesianShortest)
            .unwrap()
            .unwrap();
        let z = Normal::new(0.0, 1.0).unwrap().inverse_cdf(0.5 * (1.0 + 0.683));
        let half = z * (0.25f64 / 1.0e6).sqrt();
        assert_abs_diff_eq!(r.err_low(), half, epsilon = 1e-3 * half);
        assert_abs_diff_eq!(r.err_high(), half, epsilon = 1e-3 * half);
    }

    #[test]
    fn test_method_serde_names() {
        let m: IntervalMethod = serde_json::from_str("\"clopper_pearson\"").unwrap();
        assert_eq!(m, IntervalMethod::ClopperPearson);
        assert_eq!(IntervalMethod::default(), IntervalMethod::BayesianShortest);
    }

    proptest! {
        #[test]
        fn prop_interval_contains_point_and_is_bounded(
            total in 1u64..400,
            frac in 0.0f64..=1.0,
            level in 0.5f64..0.99,
            which in 0usize..3,
        ) {
            let pass = ((total as f64) * frac).floor() as u64;
            let r = binomial_interval(pass, total, level, METHODS[which]).unwrap().unwrap();
            prop_assert!(r.lower >= 0.0);
            prop_assert!(r.upper <= 1.0);
            prop_assert!(r.err_low() >= 0.0);
            prop_assert!(r.err_high() >= 0.0);
            prop_assert!(r.lower <= r.point && r.point <= r.upper);
        }

        #[test]
        fn prop_bayesian_interval_holds_level(
            total in 1u64..2_000,
            frac in 0.0f64..=1.0,
            level in 0.3f64..0.99,
        ) {
            let pass = ((total as f64) * frac).floor() as u64;
            let r = binomial_interval(pass, total, level, IntervalMethod::BayesianShortest)
                .unwrap()
                .unwrap();
            let mass = posterior_mass(pass, total, &r);
            prop_assert!((mass - level).abs() < 1e-8, "mass={} level={} r={:?}", mass, level, r);
        }

        #[test]
        fn prop_clopper_pearson_tails(
            total in 1u64..2_000,
            frac in 0.0f64..=1.0,
            level in 0.3f64..0.99,
        ) {
            let pass = ((total as f64) * frac).floor() as u64;
            let (k, n) = (pass as f64, total as f64);
            let half_alpha = 0.5 * (1.0 - level);
            let r = binomial_interval(pass, total, level, IntervalMethod::ClopperPearson)
                .unwrap()
                .unwrap();
            if pass == 0 {
                prop_assert_eq!(r.lower, 0.0);
            } else {
                let below = beta::cdf(r.lower, k, n - k + 1.0).unwrap();
                prop_assert!((below - half_alpha).abs() < 1e-9, "below={}", below);
            }
            if pass == total {
                prop_assert_eq!(r.upper, 1.0);
            } else {
                let above = 1.0 - beta::cdf(r.upper, k + 1.0, n - k).unwrap();
                prop_assert!((above - half_alpha).abs() < 1e-9, "above={}", above);
            }
        }
    }
}
