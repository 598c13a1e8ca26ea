//! Probability building blocks for spinestat.
//!
//! - Beta posterior helpers (CDF, quantile, mode, shortest interval)
//! - the regularized incomplete beta function they rest on
//! - confidence intervals for binomial ratios (efficiency, purity)

pub mod beta;
pub mod math;
pub mod interval;

pub use interval::{
    binomial_interval, IntervalMethod, RatioInterval, DEFAULT_CONFIDENCE_LEVEL,
};
