//! Typed event predicates and ordered cut flows.
//!
//! A [`CutFlow`] is evaluated cumulatively: stage `i` keeps the events that
//! pass cuts `0..=i`. The conjunction is structural (first failing cut ends
//! the chain), never built from strings.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use sp_core::{CategoryKey, Error, EventRecord, Result};

/// Comparison operator for [`Predicate::Compare`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareOp {
    /// `==`
    #[serde(rename = "==")]
    Eq,
    /// `!=`
    #[serde(rename = "!=")]
    Ne,
    /// `<`
    #[serde(rename = "<")]
    Lt,
    /// `<=`
    #[serde(rename = "<=")]
    Le,
    /// `>`
    #[serde(rename = ">")]
    Gt,
    /// `>=`
    #[serde(rename = ">=")]
    Ge,
}

impl CompareOp {
    fn apply(self, lhs: f64, rhs: f64) -> bool {
        match self {
            CompareOp::Eq => lhs == rhs,
            CompareOp::Ne => lhs != rhs,
            CompareOp::Lt => lhs < rhs,
            CompareOp::Le => lhs <= rhs,
            CompareOp::Gt => lhs > rhs,
            CompareOp::Ge => lhs >= rhs,
        }
    }
}

/// Boolean condition over an event.
///
/// A predicate that reads a field the event does not carry evaluates to
/// `false` (before any `not`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    /// Always true.
    Always,
    /// Field equals 1 (a "satisfied" flag).
    Flag(String),
    /// `field <op> value`
    Compare {
        /// Field name.
        field: String,
        /// Operator.
        op: CompareOp,
        /// Right-hand side.
        value: f64,
    },
    /// True category equals the key.
    TrueCategory(CategoryKey),
    /// Predicted category equals the key (absent predictions never match).
    PredictedCategory(CategoryKey),
    /// Every sub-predicate holds (empty = true).
    All(Vec<Predicate>),
    /// Some sub-predicate holds (empty = false).
    Any(Vec<Predicate>),
    /// Negation.
    Not(Box<Predicate>),
}

impl Predicate {
    /// Shorthand for [`Predicate::Flag`].
    pub fn flag(field: impl Into<String>) -> Self {
        Predicate::Flag(field.into())
    }

    /// Shorthand for [`Predicate::Compare`].
    pub fn compare(field: impl Into<String>, op: CompareOp, value: f64) -> Self {
        Predicate::Compare { field: field.into(), op, value }
    }

    /// Evaluate against one event.
    pub fn evaluate(&self, ev: &EventRecord) -> bool {
        match self {
            Predicate::Always => true,
            Predicate::Flag(field) => ev.field(field) == Some(1.0),
            Predicate::Compare { field, op, value } => {
                ev.field(field).is_some_and(|v| op.apply(v, *value))
            }
            Predicate::TrueCategory(k) => ev.true_category == *k,
            Predicate::PredictedCategory(k) => ev.predicted_category == Some(*k),
            Predicate::All(ps) => ps.iter().all(|p| p.evaluate(ev)),
            Predicate::Any(ps) => ps.iter().any(|p| p.evaluate(ev)),
            Predicate::Not(p) => !p.evaluate(ev),
        }
    }

    /// Number of events in `events` satisfying the predicate.
    pub fn count<'a, I>(&self, events: I) -> u64
    where
        I: IntoIterator<Item = &'a EventRecord>,
    {
        events.into_iter().filter(|ev| self.evaluate(ev)).count() as u64
    }
}

/// A named cut.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cut {
    /// Display name, e.g. "Fiducial Cut".
    pub name: String,
    /// Condition the cut requires.
    pub predicate: Predicate,
}

impl Cut {
    /// Create a cut.
    pub fn new(name: impl Into<String>, predicate: Predicate) -> Self {
        Self { name: name.into(), predicate }
    }
}

/// Ordered list of cuts applied as a cumulative conjunction.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CutFlow {
    cuts: Vec<Cut>,
}

impl CutFlow {
    /// Build a flow; cut names must be non-empty and unique.
    pub fn new(cuts: Vec<Cut>) -> Result<Self> {
        let mut seen = HashSet::new();
        for cut in &cuts {
            if cut.name.trim().is_empty() {
                return Err(Error::Validation("cut name must not be empty".to_string()));
            }
            if !seen.insert(cut.name.as_str()) {
                return Err(Error::Validation(format!("duplicate cut name: {}", cut.name)));
            }
        }
        Ok(Self { cuts })
    }

    /// Cuts in declared order.
    pub fn cuts(&self) -> &[Cut] {
        &self.cuts
    }

    /// Number of cuts.
    pub fn len(&self) -> usize {
        self.cuts.len()
    }

    /// True when the flow has no cuts.
    pub fn is_empty(&self) -> bool {
        self.cuts.is_empty()
    }

    /// Number of leading cuts `ev` passes (stops at the first failure).
    pub fn stages_passed(&self, ev: &EventRecord) -> usize {
        self.cuts.iter().take_while(|c| c.predicate.evaluate(ev)).count()
    }

    /// Conjunction of the first `n_cuts` cuts.
    pub fn cumulative(&self, n_cuts: usize) -> Predicate {
        Predicate::All(self.cuts.iter().take(n_cuts).map(|c| c.predicate.clone()).collect())
    }

    /// Survivors per stage among events satisfying `filter`.
    ///
    /// `out[0]` counts all filtered events (no cut); `out[i]` counts those
    /// passing the first `i` cuts.
    pub fn stage_counts<'a, I, F>(&self, events: I, filter: F) -> Vec<u64>
    where
        I: IntoIterator<Item = &'a EventRecord>,
        F: Fn(&EventRecord) -> bool,
    {
        let mut reached = vec![0u64; self.cuts.len() + 1];
        for ev in events.into_iter().filter(|ev| filter(*ev)) {
            let passed = self.stages_passed(ev);
            for slot in reached.iter_mut().take(passed + 1) {
                *slot += 1;
            }
        }
        reached
    }
}
