//! Event-table loading (JSON) into role-keyed samples.

use anyhow::{Context, Result};
use serde::Deserialize;
use sp_core::{resolve_prediction, CategoryKey, EventRecord, Sample, SampleRole, SampleSet};
use std::collections::BTreeMap;
use std::path::Path;

use crate::config::AnalysisConfig;

#[derive(Debug, Deserialize)]
struct SampleFile {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    exposure: f64,
    #[serde(default)]
    livetime: f64,
    events: Vec<RawEvent>,
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    true_category: CategoryKey,
    #[serde(default)]
    predicted_category: Option<f64>,
    #[serde(default = "default_weight")]
    weight: f64,
    #[serde(default)]
    fields: BTreeMap<String, f64>,
}

fn default_weight() -> f64 {
    1.0
}

/// Read one event-table file.
pub fn read_sample(path: &Path) -> Result<Sample> {
    let bytes =
        std::fs::read(path).with_context(|| format!("reading sample {}", path.display()))?;
    let file: SampleFile = serde_json::from_slice(&bytes)
        .with_context(|| format!("parsing sample {}", path.display()))?;

    let mut absent = 0usize;
    let events: Vec<EventRecord> = file
        .events
        .into_iter()
        .map(|raw| {
            let predicted_category = resolve_prediction(raw.predicted_category);
            if predicted_category.is_none() {
                absent += 1;
            }
            EventRecord {
                true_category: raw.true_category,
                predicted_category,
                weight: raw.weight,
                fields: raw.fields,
            }
        })
        .collect();

    let name = file.name.unwrap_or_else(|| {
        path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default()
    });
    let sample = Sample::new(name, events, file.exposure, file.livetime);
    tracing::info!(
        sample = %sample.name,
        n_events = sample.len(),
        total_weight = sample.total_weight(),
        n_without_prediction = absent,
        exposure = sample.exposure,
        livetime = sample.livetime,
        "sample loaded"
    );
    Ok(sample)
}

/// Load every file for each role in `roles`, concatenating per role.
///
/// A role with no configured files fails before anything is read.
pub fn load_samples(cfg: &AnalysisConfig, roles: &[SampleRole]) -> Result<SampleSet> {
    let mut plan = Vec::with_capacity(roles.len());
    for &role in roles {
        let paths = cfg.sample_paths(role).filter(|p| !p.is_empty());
        let paths = paths.ok_or(sp_core::Error::MissingSample(role))?;
        plan.push((role, paths));
    }

    let mut set = SampleSet::new();
    for (role, paths) in plan {
        let parts = paths.iter().map(|p| read_sample(p)).collect::<Result<Vec<_>>>()?;
        set.insert(role, Sample::concat(role.as_str(), parts)?);
    }
    Ok(set)
}
