//! Beta distribution utilities.

use sp_core::{Error, Result};

use crate::math::beta_reg;

const GOLDEN: f64 = 0.618_033_988_749_894_9;
const SEARCH_TOL: f64 = 1e-10;
const SEARCH_MAX_ITER: usize = 200;

const QUANTILE_REL_TOL: f64 = 1e-15;
const QUANTILE_MAX_ITER: usize = 1_200;

fn validate_shape(a: f64, b: f64) -> Result<()> {
    if !a.is_finite() || a <= 0.0 {
        return Err(Error::Validation(format!("a must be finite and > 0, got {}", a)));
    }
    if !b.is_finite() || b <= 0.0 {
        return Err(Error::Validation(format!("b must be finite and > 0, got {}", b)));
    }
    Ok(())
}

fn validate_level(level: f64) -> Result<()> {
    if !level.is_finite() || level <= 0.0 || level >= 1.0 {
        return Err(Error::Validation(format!("level must be in (0, 1), got {}", level)));
    }
    Ok(())
}

/// CDF of Beta(`a`, `b`) at `x` (the regularized incomplete beta function).
pub fn cdf(x: f64, a: f64, b: f64) -> Result<f64> {
    validate_shape(a, b)?;
    if x.is_nan() {
        return Err(Error::Validation("x must not be NaN".to_string()));
    }
    Ok(beta_reg(a, b, x))
}

/// Quantile (inverse CDF) of Beta(`a`, `b`) at probability `p`.
///
/// Bisection on the CDF down to a relative width of 1e-15, so tiny
/// quantiles (large counts with few passes) keep full precision.
pub fn quantile(p: f64, a: f64, b: f64) -> Result<f64> {
    validate_shape(a, b)?;
    if !(0.0..=1.0).contains(&p) {
        return Err(Error::Validation(format!("p must be in [0, 1], got {}", p)));
    }
    if p == 0.0 {
        return Ok(0.0);
    }
    if p == 1.0 {
        return Ok(1.0);
    }

    let (mut lo, mut hi) = (0.0_f64, 1.0_f64);
    for _ in 0..QUANTILE_MAX_ITER {
        let mid = 0.5 * (lo + hi);
        if mid <= lo || mid >= hi {
            break;
        }
        if beta_reg(a, b, mid) < p {
            lo = mid;
        } else {
            hi = mid;
        }
        if hi - lo <= QUANTILE_REL_TOL * hi {
            break;
        }
    }
    Ok(0.5 * (lo + hi))
}

/// Mode of Beta(`a`, `b`), defined for `a, b >= 1` (not both equal to 1).
pub fn mode(a: f64, b: f64) -> Result<f64> {
    validate_shape(a, b)?;
    if a < 1.0 || b < 1.0 || (a == 1.0 && b == 1.0) {
        return Err(Error::Validation(format!("mode undefined for Beta({}, {})", a, b)));
    }
    Ok((a - 1.0) / (a + b - 2.0))
}

/// Shortest interval `[lo, hi]` holding probability `level` under Beta(`a`, `b`).
///
/// Monotone densities (`a <= 1` or `b <= 1`) put the interval against the
/// boundary where the density is largest. Otherwise the interval contains the
/// mode, which bounds the lower-tail mass `t` to
/// `[cdf(mode) - level, cdf(mode)]`; `t` is then found by golden section so
/// that `Q(t + level) - Q(t)` is minimal.
pub fn shortest_interval(a: f64, b: f64, level: f64) -> Result<(f64, f64)> {
    validate_shape(a, b)?;
    validate_level(level)?;

    if a <= 1.0 && b <= 1.0 {
        if a == 1.0 && b == 1.0 {
            // Uniform: every interval of width `level` is shortest.
            let tail = 0.5 * (1.0 - level);
            return Ok((tail, 1.0 - tail));
        }
        return Err(Error::Validation(format!(
            "shortest interval undefined for U-shaped Beta({}, {})",
            a, b
        )));
    }
    if a <= 1.0 {
        return Ok((0.0, quantile(level, a, b)?));
    }
    if b <= 1.0 {
        return Ok((quantile(1.0 - level, a, b)?, 1.0));
    }

    let mode_mass = cdf(mode(a, b)?, a, b)?;
    let width = |t: f64| -> Result<f64> { Ok(quantile(t + level, a, b)? - quantile(t, a, b)?) };

    let mut lo = (mode_mass - level).max(0.0);
    let mut hi = mode_mass.min(1.0 - level);
    let mut x1 = hi - GOLDEN * (hi - lo);
    let mut x2 = lo + GOLDEN * (hi - lo);
    let mut f1 = width(x1)?;
    let mut f2 = width(x2)?;
    for _ in 0..SEARCH_MAX_ITER {
        if (hi - lo).abs() < SEARCH_TOL {
            break;
        }
        if f1 < f2 {
            hi = x2;
            x2 = x1;
            f2 = f1;
            x1 = hi - GOLDEN * (hi - lo);
            f1 = width(x1)?;
        } else {
            lo = x1;
            x1 = x2;
            f1 = f2;
            x2 = lo + GOLDEN * (hi - lo);
            f2 = width(x2)?;
        }
    }

    let t = 0.5 * (lo + hi);
    Ok((quantile(t, a, b)?, quantile((t + level).min(1.0), a, b)?))
}
