//! # sp-eval
//!
//! Classification-evaluation statistics for event-selection studies:
//! confusion matrices, binned efficiencies with asymmetric intervals, and
//! exposure-scaled purities, plus cut-flow variants of the latter two.
//!
//! Accumulators are single-writer; to parallelise, accumulate partitions into
//! separate instances and `merge` them.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Category registry (ordered keys, reserved null category).
pub mod registry;

/// Confusion-matrix accumulation and normalised views.
pub mod confusion;

/// Bin layouts and edge policy.
pub mod binning;

/// Typed predicates and cumulative cut flows.
pub mod cuts;

/// Binned efficiency estimator.
pub mod efficiency;

/// Overall and per-cut selection efficiency.
pub mod selection;

/// Exposure-scaled purity.
pub mod purity;

/// Cut-flow reports and printed summary lines.
pub mod report;

pub use binning::{Bin, Binning};
pub use confusion::{AccumulateSummary, ConfusionAccumulator, NormalizedView};
pub use cuts::{CompareOp, Cut, CutFlow, Predicate};
pub use efficiency::{BinnedEfficiencyEstimator, EfficiencyPoint, EfficiencySummary};
pub use purity::{PurityEstimator, PurityResult, ScaleFactors};
pub use registry::{Category, CategoryRegistry};
pub use report::{format_ratio, CutFlowReport, CutValue, Quantity};
pub use selection::{efficiency_by_cut, selection_efficiency, SelectionEfficiency};
