//! Confusion-matrix heatmap artifact.
//!
//! Numbers only: the renderer draws `values` as a heatmap over `[vmin, vmax]`
//! and writes `annotations` in each cell.

use serde::Serialize;
use sp_core::{CategoryKey, Result, Sample};
use sp_eval::{CategoryRegistry, ConfusionAccumulator, NormalizedView};

use crate::artist::{ArtifactMeta, Artist, ArtistMeta};

#[derive(Debug, Clone, Serialize)]
pub struct ConfusionArtifact {
    pub schema_version: String,
    pub meta: ArtifactMeta,
    pub xlabel: String,
    pub ylabel: String,
    pub show_null_column: bool,
    pub row_keys: Vec<CategoryKey>,
    pub row_labels: Vec<String>,
    pub column_keys: Vec<CategoryKey>,
    pub column_labels: Vec<String>,
    /// `values[r][c]`, row-normalised.
    pub values: Vec<Vec<f64>>,
    /// Cell text, e.g. `"42.10%"`.
    pub annotations: Vec<Vec<String>>,
    pub vmin: f64,
    pub vmax: f64,
    /// Cells above this value get light text.
    pub text_contrast_threshold: f64,
    pub accepted_events: u64,
    pub discarded_events: u64,
}

/// Percent annotation with two decimals.
pub fn percent_label(v: f64) -> String {
    format!("{:.2}%", 100.0 * v)
}

/// Draws a row-normalised confusion matrix of true vs predicted category.
#[derive(Debug, Clone)]
pub struct ConfusionArtist {
    meta: ArtistMeta,
    accumulator: ConfusionAccumulator,
    show_null_column: bool,
    xlabel: String,
    ylabel: String,
}

impl ConfusionArtist {
    /// Artist over `registry` (null category added by the accumulator).
    pub fn new(registry: CategoryRegistry, title: Option<String>) -> Self {
        Self {
            meta: ArtistMeta::new(title),
            accumulator: ConfusionAccumulator::new(registry),
            show_null_column: false,
            xlabel: "Class Prediction".to_string(),
            ylabel: "Class Label".to_string(),
        }
    }

    /// Builder: keep the null predicted column in the drawn matrix.
    pub fn with_null_column(mut self, show: bool) -> Self {
        self.show_null_column = show;
        self
    }

    /// Builder: axis labels.
    pub fn with_labels(mut self, xlabel: impl Into<String>, ylabel: impl Into<String>) -> Self {
        self.xlabel = xlabel.into();
        self.ylabel = ylabel.into();
        self
    }

    /// Underlying accumulator.
    pub fn accumulator(&self) -> &ConfusionAccumulator {
        &self.accumulator
    }

    /// Normalised view that `draw` renders.
    pub fn view(&self) -> NormalizedView {
        self.accumulator.normalized_view(self.show_null_column)
    }
}

impl Artist for ConfusionArtist {
    type Artifact = ConfusionArtifact;

    fn meta(&self) -> &ArtistMeta {
        &self.meta
    }

    fn add_sample(&mut self, sample: &Sample) -> Result<()> {
        self.meta.record(sample);
        self.accumulator.accumulate(&sample.events);
        Ok(())
    }

    fn draw(&self) -> Result<ConfusionArtifact> {
        let view = self.view();
        let annotations =
            view.values.iter().map(|row| row.iter().map(|&v| percent_label(v)).collect()).collect();
        let totals = self.accumulator.totals();
        Ok(ConfusionArtifact {
            schema_version: "spinestat_confusion_v0".to_string(),
            meta: self.meta.to_artifact_meta()?,
            xlabel: self.xlabel.clone(),
            ylabel: self.ylabel.clone(),
            show_null_column: self.show_null_column,
            text_contrast_threshold: view.max_value() / 2.0,
            row_keys: view.row_keys,
            row_labels: view.row_labels,
            column_keys: view.column_keys,
            column_labels: view.column_labels,
            values: view.values,
            annotations,
            vmin: 0.0,
            vmax: 1.0,
            accepted_events: totals.accepted,
            discarded_events: totals.discarded(),
        })
    }
}
