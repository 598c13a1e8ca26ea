//! Efficiency-vs-variable artifact.
//!
//! Two overlaid series: the display histogram (entries per coarse bin, left
//! axis) and efficiency points with asymmetric x/y errors (right axis, [0, 1]).
//! Empty efficiency bins carry `null` in `y`.

use serde::Serialize;
use sp_core::{Result, Sample};
use sp_eval::{BinnedEfficiencyEstimator, EfficiencyPoint};
use sp_prob::IntervalMethod;

use crate::artist::{ArtifactMeta, Artist, ArtistMeta};

#[derive(Debug, Clone, Serialize)]
pub struct EfficiencyArtifact {
    pub schema_version: String,
    pub meta: ArtifactMeta,
    pub variable: String,
    pub xlabel: String,
    pub interval: IntervalSpec,
    pub display: DisplayHistogram,
    pub points: Vec<EfficiencyPoint>,
    pub x: Vec<f64>,
    pub x_err_lo: Vec<f64>,
    pub x_err_hi: Vec<f64>,
    pub y: Vec<Option<f64>>,
    pub y_err_lo: Vec<f64>,
    pub y_err_hi: Vec<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IntervalSpec {
    pub method: IntervalMethod,
    pub confidence_level: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DisplayHistogram {
    pub bin_edges: Vec<f64>,
    pub counts: Vec<u64>,
}

/// Draws selection efficiency as a function of one event field.
#[derive(Debug, Clone)]
pub struct EfficiencyArtist {
    meta: ArtistMeta,
    estimator: BinnedEfficiencyEstimator,
    xlabel: String,
}

impl EfficiencyArtist {
    /// Wrap a configured estimator.
    pub fn new(estimator: BinnedEfficiencyEstimator, title: Option<String>) -> Self {
        let xlabel = estimator.variable().to_string();
        Self { meta: ArtistMeta::new(title), estimator, xlabel }
    }

    /// Builder: x-axis label (defaults to the variable name).
    pub fn with_xlabel(mut self, xlabel: impl Into<String>) -> Self {
        self.xlabel = xlabel.into();
        self
    }

    /// Underlying estimator.
    pub fn estimator(&self) -> &BinnedEfficiencyEstimator {
        &self.estimator
    }
}

impl Artist for EfficiencyArtist {
    type Artifact = EfficiencyArtifact;

    fn meta(&self) -> &ArtistMeta {
        &self.meta
    }

    fn add_sample(&mut self, sample: &Sample) -> Result<()> {
        self.meta.record(sample);
        self.estimator.accumulate(&sample.events);
        Ok(())
    }

    fn draw(&self) -> Result<EfficiencyArtifact> {
        let points = self.estimator.finalize()?;
        let hist = self.estimator.display_histogram();

        Ok(EfficiencyArtifact {
            schema_version: "spinestat_efficiency_v0".to_string(),
            meta: self.meta.to_artifact_meta()?,
            variable: self.estimator.variable().to_string(),
            xlabel: self.xlabel.clone(),
            interval: IntervalSpec {
                method: self.estimator.method(),
                confidence_level: self.estimator.confidence_level(),
            },
            display: DisplayHistogram {
                bin_edges: self.estimator.display_binning().edges().to_vec(),
                counts: hist.iter().map(|(_, n)| *n).collect(),
            },
            x: points.iter().map(|p| p.bin.center).collect(),
            x_err_lo: points.iter().map(|p| p.bin.center - p.bin.lower).collect(),
            x_err_hi: points.iter().map(|p| p.bin.upper - p.bin.center).collect(),
            y: points.iter().map(|p| p.ratio).collect(),
            y_err_lo: points.iter().map(|p| p.err_low).collect(),
            y_err_hi: points.iter().map(|p| p.err_high).collect(),
            points,
        })
    }
}
