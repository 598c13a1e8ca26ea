//! Binned selection efficiency with asymmetric intervals.
//!
//! Two layouts share one range: the caller's (possibly variable-width)
//! display binning, filled with plain entry counts, and a uniform efficiency
//! binning holding pass/total counters. Values outside the range are
//! filtered out before either is filled.

use serde::Serialize;
use sp_core::{Error, EventRecord, Result};
use sp_prob::{binomial_interval, IntervalMethod, DEFAULT_CONFIDENCE_LEVEL};

use crate::binning::{Bin, Binning};
use crate::cuts::Predicate;

/// Efficiency in one bin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EfficiencyPoint {
    /// The bin.
    pub bin: Bin,
    /// Events passing the selection.
    pub pass_count: u64,
    /// Events in the bin.
    pub total_count: u64,
    /// `pass / total`; `None` when the bin is empty.
    pub ratio: Option<f64>,
    /// `ratio - lower` (0 for an empty bin).
    pub err_low: f64,
    /// `upper - ratio` (0 for an empty bin).
    pub err_high: f64,
}

/// Per-batch accounting returned by [`BinnedEfficiencyEstimator::accumulate`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EfficiencySummary {
    /// Events booked into a bin.
    pub binned: u64,
    /// Of those, events passing the selection.
    pub passed: u64,
    /// Events outside the range (or with a non-finite value).
    pub out_of_range: u64,
    /// Events without the variable field.
    pub missing_variable: u64,
}

impl EfficiencySummary {
    /// Every event seen.
    pub fn seen(&self) -> u64 {
        self.binned + self.out_of_range + self.missing_variable
    }

    fn add(&mut self, other: &EfficiencySummary) {
        self.binned += other.binned;
        self.passed += other.passed;
        self.out_of_range += other.out_of_range;
        self.missing_variable += other.missing_variable;
    }
}

/// Pass/total counters over a uniform binning of one variable.
#[derive(Debug, Clone)]
pub struct BinnedEfficiencyEstimator {
    variable: String,
    selection: Predicate,
    display: Binning,
    binning: Binning,
    display_counts: Vec<u64>,
    pass: Vec<u64>,
    total: Vec<u64>,
    method: IntervalMethod,
    level: f64,
    totals: EfficiencySummary,
}

impl BinnedEfficiencyEstimator {
    /// Estimator for field `variable` over `range = [lo, ..., hi]` with
    /// `nbins` uniform efficiency bins.
    ///
    /// `range` doubles as the display binning edges.
    pub fn new(
        variable: impl Into<String>,
        range: &[f64],
        nbins: usize,
        selection: Predicate,
    ) -> Result<Self> {
        let display = Binning::new(range.to_vec())?;
        let binning = Binning::uniform(display.lo(), display.hi(), nbins)?;
        Ok(Self {
            variable: variable.into(),
            selection,
            display_counts: vec![0; display.n_bins()],
            pass: vec![0; nbins],
            total: vec![0; nbins],
            display,
            binning,
            method: IntervalMethod::default(),
            level: DEFAULT_CONFIDENCE_LEVEL,
            totals: EfficiencySummary::default(),
        })
    }

    /// Builder: choose the interval method and coverage.
    pub fn with_interval(mut self, method: IntervalMethod, level: f64) -> Result<Self> {
        if !level.is_finite() || level <= 0.0 || level >= 1.0 {
            return Err(Error::Validation(format!(
                "confidence level must be in (0, 1), got {}",
                level
            )));
        }
        self.method = method;
        self.level = level;
        Ok(self)
    }

    /// Field the estimator bins on.
    pub fn variable(&self) -> &str {
        &self.variable
    }

    /// Uniform efficiency binning.
    pub fn binning(&self) -> &Binning {
        &self.binning
    }

    /// Coarse display binning.
    pub fn display_binning(&self) -> &Binning {
        &self.display
    }

    /// Interval method in use.
    pub fn method(&self) -> IntervalMethod {
        self.method
    }

    /// Coverage in use.
    pub fn confidence_level(&self) -> f64 {
        self.level
    }

    /// Accounting over every batch seen so far.
    pub fn totals(&self) -> EfficiencySummary {
        self.totals
    }

    /// Book a batch of events.
    pub fn accumulate<'a, I>(&mut self, events: I) -> EfficiencySummary
    where
        I: IntoIterator<Item = &'a EventRecord>,
    {
        let mut summary = EfficiencySummary::default();
        for ev in events {
            let Some(x) = ev.field(&self.variable) else {
                summary.missing_variable += 1;
                continue;
            };
            let Some(i) = self.binning.find_bin(x) else {
                summary.out_of_range += 1;
                continue;
            };
            if let Some(d) = self.display.find_bin(x) {
                self.display_counts[d] += 1;
            }
            self.total[i] += 1;
            summary.binned += 1;
            if self.selection.evaluate(ev) {
                self.pass[i] += 1;
                summary.passed += 1;
            }
        }

        if summary.missing_variable + summary.out_of_range > 0 {
            log::warn!(
                "efficiency[{}]: skipped {} events ({} out of range, {} lacking the variable)",
                self.variable,
                summary.missing_variable + summary.out_of_range,
                summary.out_of_range,
                summary.missing_variable
            );
        }
        log::debug!(
            "efficiency[{}]: binned {} ({} passed)",
            self.variable,
            summary.binned,
            summary.passed
        );

        self.totals.add(&summary);
        summary
    }

    /// Add another estimator's counters. Layouts must match.
    pub fn merge(&mut self, other: &BinnedEfficiencyEstimator) -> Result<()> {
        if self.binning != other.binning || self.display != other.display {
            return Err(Error::Validation(format!(
                "cannot merge efficiency estimators with different binnings ({})",
                self.variable
            )));
        }
        for (d, s) in self.pass.iter_mut().zip(&other.pass) {
            *d += s;
        }
        for (d, s) in self.total.iter_mut().zip(&other.total) {
            *d += s;
        }
        for (d, s) in self.display_counts.iter_mut().zip(&other.display_counts) {
            *d += s;
        }
        self.totals.add(&other.totals);
        Ok(())
    }

    /// Entry counts per display bin.
    pub fn display_histogram(&self) -> Vec<(Bin, u64)> {
        self.display.bins().into_iter().zip(self.display_counts.iter().copied()).collect()
    }

    /// One point per efficiency bin, in increasing order.
    pub fn finalize(&self) -> Result<Vec<EfficiencyPoint>> {
        let mut points = Vec::with_capacity(self.binning.n_bins());
        for (i, bin) in self.binning.bins().into_iter().enumerate() {
            let (pass_count, total_count) = (self.pass[i], self.total[i]);
            let point = match binomial_interval(pass_count, total_count, self.level, self.method)? {
                Some(r) => EfficiencyPoint {
                    bin,
                    pass_count,
                    total_count,
                    ratio: Some(r.point),
                    err_low: r.err_low(),
                    err_high: r.err_high(),
                },
                None => EfficiencyPoint {
                    bin,
                    pass_count,
                    total_count,
                    ratio: None,
                    err_low: 0.0,
                    err_high: 0.0,
                },
            };
            points.push(point);
        }
        Ok(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn event(x: f64, pass: bool) -> EventRecord {
        EventRecord::new(0, Some(0))
            .with_field("x", x)
            .with_field("selected", if pass { 1.0 } else { 0.0 })
    }

    fn estimator(range: &[f64], nbins: usize) -> BinnedEfficiencyEstimator {
        BinnedEfficiencyEstimator::new("x", range, nbins, Predicate::flag("selected")).unwrap()
    }

    #[test]
    fn test_two_bin_scenario() {
        let mut est = estimator(&[0.0, 10.0, 20.0], 2);
        est.accumulate(&[event(1.0, false), event(5.0, true), event(15.0, false)]);
        let pts = est.finalize().unwrap();
        assert_eq!(pts.len(), 2);

        assert_eq!((pts[0].pass_count, pts[0].total_count), (1, 2));
        assert_eq!(pts[0].ratio, Some(0.5));

        assert_eq!((pts[1].pass_count, pts[1].total_count), (0, 1));
        assert_eq!(pts[1].ratio, Some(0.0));
        assert_eq!(pts[1].err_low, 0.0);
        assert!(pts[1].err_high > 0.0);
    }

    #[test]
    fn test_empty_bin_is_undefined() {
        let mut est = estimator(&[0.0, 30.0], 3);
        est.accumulate(&[event(1.0, true), event(25.0, false)]);
        let pts = est.finalize().unwrap();
        assert_eq!(pts[1].total_count, 0);
        assert_eq!(pts[1].ratio, None);
        assert_eq!((pts[1].err_low, pts[1].err_high), (0.0, 0.0));
    }

    #[test]
    fn test_edges_and_range_filter() {
        let mut est = estimator(&[0.0, 20.0], 2);
        let s = est.accumulate(&[
            event(10.0, true),
            event(20.0, true),
            event(-1.0, true),
            event(20.5, true),
            event(f64::NAN, true),
            EventRecord::new(0, Some(0)),
        ]);
        assert_eq!(s.binned, 2);
        assert_eq!(s.out_of_range, 3);
        assert_eq!(s.missing_variable, 1);
        assert_eq!(s.seen(), 6);
        let pts = est.finalize().unwrap();
        assert_eq!(pts[0].total_count, 0);
        assert_eq!(pts[1].total_count, 2);
    }

    #[test]
    fn test_display_histogram_uses_coarse_edges() {
        let mut est = estimator(&[0.0, 1.0, 4.0], 8);
        est.accumulate(&[event(0.5, true), event(1.0, false), event(3.9, false), event(4.0, true)]);
        let hist = est.display_histogram();
        assert_eq!(hist.len(), 2);
        assert_eq!(hist[0].1, 1);
        assert_eq!(hist[1].1, 3);
        assert_eq!(est.binning().n_bins(), 8);
    }

    #[test]
    fn test_configuration_errors() {
        assert!(BinnedEfficiencyEstimator::new("x", &[1.0, 0.0], 2, Predicate::Always).is_err());
        assert!(BinnedEfficiencyEstimator::new("x", &[0.0, 1.0], 0, Predicate::Always).is_err());
        assert!(estimator(&[0.0, 1.0], 2).with_interval(IntervalMethod::Wilson, 1.2).is_err());
    }

    #[test]
    fn test_points_serialize_with_null_ratio() {
        let mut est = estimator(&[0.0, 30.0], 3);
        est.accumulate(&[event(1.0, true), event(2.0, false)]);
        let json = serde_json::to_value(est.finalize().unwrap()).unwrap();
        assert_eq!(json[0]["ratio"], 0.5);
        assert_eq!(json[0]["bin"]["lower"], 0.0);
        assert_eq!(json[0]["bin"]["upper"], 10.0);
        assert!(json[1]["ratio"].is_null());
        assert_eq!(json[1]["total_count"], 0);
    }

    #[test]
    fn test_merge_requires_same_layout() {
        let mut a = estimator(&[0.0, 1.0], 2);
        let b = estimator(&[0.0, 1.0], 3);
        assert!(a.merge(&b).is_err());
    }

    proptest! {
        #[test]
        fn prop_points_respect_invariants(
            values in proptest::collection::vec((-5.0f64..105.0, any::<bool>()), 0..300),
            nbins in 1usize..12,
            split in 0usize..300,
        ) {
            let events: Vec<EventRecord> = values.iter().map(|&(x, p)| event(x, p)).collect();
            let split = split.min(events.len());

            let mut whole = estimator(&[0.0, 50.0, 100.0], nbins);
            whole.accumulate(&events);

            let mut left = estimator(&[0.0, 50.0, 100.0], nbins);
            let mut right = estimator(&[0.0, 50.0, 100.0], nbins);
            left.accumulate(&events[..split]);
            right.accumulate(&events[split..]);
            left.merge(&right).unwrap();

            let pts = whole.finalize().unwrap();
            prop_assert_eq!(&pts, &left.finalize().unwrap());
            prop_assert_eq!(whole.totals().seen(), events.len() as u64);

            for p in &pts {
                prop_assert!(p.pass_count <= p.total_count);
                prop_assert!(p.err_low >= 0.0 && p.err_high >= 0.0);
                match p.ratio {
                    Some(r) => {
                        prop_assert!(r - p.err_low >= -1e-12);
                        prop_assert!(r + p.err_high <= 1.0 + 1e-12);
                    }
                    None => prop_assert_eq!(p.total_count, 0),
                }
            }
        }
    }
}
