//! Common data types for spinestat

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Integer key identifying a category (interaction class, topology, ...).
pub type CategoryKey = i64;

/// Reserved key for "no prediction / missing label".
pub const NULL_CATEGORY: CategoryKey = -1;

/// Display name of [`NULL_CATEGORY`].
pub const NULL_CATEGORY_NAME: &str = "Null";

/// Resolve a raw predicted label into an explicit optional key.
///
/// `None`, non-finite and non-integral values all mean "no prediction".
pub fn resolve_prediction(raw: Option<f64>) -> Option<CategoryKey> {
    let v = raw?;
    if !v.is_finite() || v.fract() != 0.0 {
        return None;
    }
    if v < i64::MIN as f64 || v > i64::MAX as f64 {
        return None;
    }
    Some(v as CategoryKey)
}

fn default_weight() -> f64 {
    1.0
}

/// A single labeled event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// True (simulated) category.
    pub true_category: CategoryKey,

    /// Predicted category, `None` when the classifier gave no answer.
    #[serde(default)]
    pub predicted_category: Option<CategoryKey>,

    /// Event weight (defaults to 1).
    #[serde(default = "default_weight")]
    pub weight: f64,

    /// Named numeric fields (cut flags, kinematic variables).
    #[serde(default)]
    pub fields: BTreeMap<String, f64>,
}

impl EventRecord {
    /// Unit-weight event with no extra fields.
    pub fn new(true_category: CategoryKey, predicted_category: Option<CategoryKey>) -> Self {
        Self { true_category, predicted_category, weight: 1.0, fields: BTreeMap::new() }
    }

    /// Builder: set the event weight.
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// Builder: set a named field.
    pub fn with_field(mut self, name: impl Into<String>, value: f64) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    /// Value of a named field, if present.
    pub fn field(&self, name: &str) -> Option<f64> {
        self.fields.get(name).copied()
    }
}

/// Role a sample plays in an analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleRole {
    /// Signal-only simulation (efficiency denominator).
    Signal,
    /// Full simulated selection (neutrino + cosmic), the MC side of purity.
    Simulation,
    /// Beam-on data; provides the reference exposure and livetime.
    OnSource,
    /// Beam-off data; the data-driven background.
    OffSource,
}

impl SampleRole {
    /// All roles in canonical order.
    pub const ALL: [SampleRole; 4] =
        [SampleRole::Signal, SampleRole::Simulation, SampleRole::OnSource, SampleRole::OffSource];

    /// Stable snake_case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            SampleRole::Signal => "signal",
            SampleRole::Simulation => "simulation",
            SampleRole::OnSource => "on_source",
            SampleRole::OffSource => "off_source",
        }
    }
}

impl fmt::Display for SampleRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named collection of events with its normalisation scalars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Sample name.
    pub name: String,
    /// Events in load order.
    pub events: Vec<EventRecord>,
    /// Accumulated beam exposure (POT).
    pub exposure: f64,
    /// Livetime (spills / triggers).
    pub livetime: f64,
}

impl Sample {
    /// Create a sample.
    pub fn new(
        name: impl Into<String>,
        events: Vec<EventRecord>,
        exposure: f64,
        livetime: f64,
    ) -> Self {
        Self { name: name.into(), events, exposure, livetime }
    }

    /// Concatenate several samples into one.
    ///
    /// Exposure and livetime are taken from the first part.
    pub fn concat(name: impl Into<String>, parts: Vec<Sample>) -> Result<Sample> {
        let mut iter = parts.into_iter();
        let first = iter
            .next()
            .ok_or_else(|| Error::Validation("cannot concatenate zero samples".to_string()))?;
        let mut out = Sample::new(name, first.events, first.exposure, first.livetime);
        for part in iter {
            out.events.extend(part.events);
        }
        Ok(out)
    }

    /// Number of events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// True when the sample holds no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Sum of event weights.
    pub fn total_weight(&self) -> f64 {
        self.events.iter().map(|e| e.weight).sum()
    }
}

/// Samples keyed by role. Lookups of absent roles fail with [`Error::MissingSample`].
#[derive(Debug, Clone, Default)]
pub struct SampleSet {
    samples: BTreeMap<SampleRole, Sample>,
}

impl SampleSet {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert (or replace) the sample for `role`.
    pub fn insert(&mut self, role: SampleRole, sample: Sample) -> Option<Sample> {
        self.samples.insert(role, sample)
    }

    /// Sample for `role`.
    pub fn get(&self, role: SampleRole) -> Result<&Sample> {
        self.samples.get(&role).ok_or(Error::MissingSample(role))
    }

    /// Fail fast unless every role in `roles` is present.
    pub fn require(&self, roles: &[SampleRole]) -> Result<()> {
        for &role in roles {
            self.get(role)?;
        }
        Ok(())
    }
}
