//! Overall and per-cut selection efficiency on the signal sample.

use serde::Serialize;
use sp_core::EventRecord;

use crate::cuts::{CutFlow, Predicate};
use crate::report::{CutFlowReport, CutValue, Quantity};

/// `selected / total` with its inputs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SelectionEfficiency {
    /// Events passing the selection.
    pub selected: u64,
    /// All events.
    pub total: u64,
    /// `selected / total`; `None` for an empty sample.
    pub value: Option<f64>,
}

fn ratio(num: u64, den: u64) -> Option<f64> {
    (den > 0).then(|| num as f64 / den as f64)
}

/// Fraction of `events` satisfying `selection`.
pub fn selection_efficiency(events: &[EventRecord], selection: &Predicate) -> SelectionEfficiency {
    let total = events.len() as u64;
    let selected = selection.count(events);
    SelectionEfficiency { selected, total, value: ratio(selected, total) }
}

/// Efficiency after each cumulative cut, relative to the full sample.
///
/// The baseline is 1 for a non-empty sample and undefined otherwise.
pub fn efficiency_by_cut(events: &[EventRecord], cuts: &CutFlow) -> CutFlowReport {
    let reached = cuts.stage_counts(events, |_| true);
    let total = reached[0];
    let stages = cuts
        .cuts()
        .iter()
        .zip(reached.iter().skip(1))
        .map(|(cut, &n)| CutValue { name: cut.name.clone(), value: ratio(n, total) })
        .collect();
    CutFlowReport { quantity: Quantity::Efficiency, baseline: ratio(total, total), stages }
}
