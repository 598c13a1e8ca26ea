//! Sample purity from simulation plus a data-driven background.
//!
//! ```text
//! matched = s_mc * N(simulation, foreground)
//! total   = s_mc * N(simulation) + s_bg * N(background)
//! purity  = matched / total            (undefined when total == 0)
//! ```
//! with `s_mc = exposure(on) / exposure(mc)` and
//! `s_bg = livetime(on) / livetime(off)`.

use serde::Serialize;
use sp_core::{Error, EventRecord, Result, SampleRole, SampleSet};

use crate::cuts::{CutFlow, Predicate};
use crate::report::{CutFlowReport, CutValue, Quantity};

/// Normalisation factors bringing each sample to the reference data volume.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScaleFactors {
    /// Applied to simulated events.
    pub simulation: f64,
    /// Applied to background (off-source) events.
    pub background: f64,
}

fn checked_ratio(what: &str, num: f64, den: f64) -> Result<f64> {
    if !num.is_finite() || !den.is_finite() || num < 0.0 || den <= 0.0 {
        return Err(Error::Validation(format!(
            "{} scale needs finite, positive normalisation, got {} / {}",
            what, num, den
        )));
    }
    Ok(num / den)
}

impl ScaleFactors {
    /// Explicit factors (finite, non-negative).
    pub fn new(simulation: f64, background: f64) -> Result<Self> {
        for (what, v) in [("simulation", simulation), ("background", background)] {
            if !v.is_finite() || v < 0.0 {
                return Err(Error::Validation(format!(
                    "{} scale must be finite and >= 0, got {}",
                    what, v
                )));
            }
        }
        Ok(Self { simulation, background })
    }

    /// Factors from the on-source, simulation and off-source samples.
    pub fn from_samples(samples: &SampleSet) -> Result<Self> {
        let on = samples.get(SampleRole::OnSource)?;
        let mc = samples.get(SampleRole::Simulation)?;
        let off = samples.get(SampleRole::OffSource)?;
        Ok(Self {
            simulation: checked_ratio("simulation", on.exposure, mc.exposure)?,
            background: checked_ratio("background", on.livetime, off.livetime)?,
        })
    }
}

/// Scaled counts and the resulting purity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PurityResult {
    /// Scaled foreground count.
    pub matched: f64,
    /// Scaled simulation plus scaled background.
    pub total: f64,
    /// `matched / total`; `None` when `total == 0`.
    pub purity: Option<f64>,
}

impl PurityResult {
    fn from_counts(scales: ScaleFactors, matched: u64, simulated: u64, background: u64) -> Self {
        let matched = scales.simulation * matched as f64;
        let total = scales.simulation * simulated as f64 + scales.background * background as f64;
        let purity = (total > 0.0).then(|| matched / total);
        Self { matched, total, purity }
    }
}

/// Purity of a selection over borrowed samples.
#[derive(Debug, Clone)]
pub struct PurityEstimator<'a> {
    signal_like: &'a [EventRecord],
    background: &'a [EventRecord],
    scales: ScaleFactors,
    foreground: Predicate,
}

impl<'a> PurityEstimator<'a> {
    /// Estimator over explicit event slices.
    pub fn new(
        signal_like: &'a [EventRecord],
        background: &'a [EventRecord],
        scales: ScaleFactors,
        foreground: Predicate,
    ) -> Self {
        Self { signal_like, background, scales, foreground }
    }

    /// Estimator over the simulation and off-source samples of `samples`.
    ///
    /// Fails fast if any of the simulation, on-source or off-source roles is
    /// missing.
    pub fn from_samples(samples: &'a SampleSet, foreground: Predicate) -> Result<Self> {
        samples.require(&[SampleRole::Simulation, SampleRole::OnSource, SampleRole::OffSource])?;
        let scales = ScaleFactors::from_samples(samples)?;
        let mc = samples.get(SampleRole::Simulation)?;
        let off = samples.get(SampleRole::OffSource)?;
        Ok(Self::new(&mc.events, &off.events, scales, foreground))
    }

    /// Scale factors in use.
    pub fn scales(&self) -> ScaleFactors {
        self.scales
    }

    /// Purity of the full samples.
    pub fn compute(&self) -> PurityResult {
        self.compute_with(&Predicate::Always)
    }

    /// Purity of the events passing `selection`.
    pub fn compute_with(&self, selection: &Predicate) -> PurityResult {
        let matched = self
            .signal_like
            .iter()
            .filter(|ev| selection.evaluate(ev) && self.foreground.evaluate(ev))
            .count() as u64;
        let simulated = selection.count(self.signal_like);
        let background = selection.count(self.background);
        let result = PurityResult::from_counts(self.scales, matched, simulated, background);
        log::debug!(
            "purity: matched={:.3} total={:.3} purity={:?}",
            result.matched,
            result.total,
            result.purity
        );
        result
    }

    /// Purity after each cumulative cut, baseline (no cut) first.
    pub fn by_cut(&self, cuts: &CutFlow) -> CutFlowReport {
        let fg = &self.foreground;
        let matched = cuts.stage_counts(self.signal_like, |ev| fg.evaluate(ev));
        let simulated = cuts.stage_counts(self.signal_like, |_| true);
        let background = cuts.stage_counts(self.background, |_| true);

        let at = |i: usize| {
            PurityResult::from_counts(self.scales, matched[i], simulated[i], background[i]).purity
        };
        let stages = cuts
            .cuts()
            .iter()
            .enumerate()
            .map(|(i, cut)| CutValue { name: cut.name.clone(), value: at(i + 1) })
            .collect();
        CutFlowReport { quantity: Quantity::Purity, baseline: at(0), stages }
    }
}
