//! Capability interface for statistics that can be drawn.
//!
//! An [`Artist`] takes samples one at a time and, on `draw`, hands back a
//! plot-ready artifact. Title and exposure bookkeeping live in
//! [`ArtistMeta`], which concrete artists hold by composition.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use sp_core::{Result, Sample};

/// A statistic that accumulates samples and renders to an artifact.
pub trait Artist {
    /// Plot-friendly output of [`Artist::draw`].
    type Artifact: Serialize;

    /// Shared title/exposure bookkeeping.
    fn meta(&self) -> &ArtistMeta;

    /// Feed one sample.
    fn add_sample(&mut self, sample: &Sample) -> Result<()>;

    /// Build the artifact from everything added so far.
    fn draw(&self) -> Result<Self::Artifact>;
}

/// Title and exposure tracked across `add_sample` calls.
#[derive(Debug, Clone, Default)]
pub struct ArtistMeta {
    title: Option<String>,
    exposure: Option<f64>,
    samples: Vec<String>,
}

impl ArtistMeta {
    /// Bookkeeping with an optional title.
    pub fn new(title: Option<String>) -> Self {
        Self { title, exposure: None, samples: Vec::new() }
    }

    /// Record a sample. The first sample with a positive exposure sets the
    /// exposure shown on the plot.
    pub fn record(&mut self, sample: &Sample) {
        if self.exposure.is_none() && sample.exposure.is_finite() && sample.exposure > 0.0 {
            self.exposure = Some(sample.exposure);
        }
        self.samples.push(sample.name.clone());
    }

    /// Plot title.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Exposure of the plotted data, if known.
    pub fn exposure(&self) -> Option<f64> {
        self.exposure
    }

    /// Header block for an artifact.
    pub fn to_artifact_meta(&self) -> Result<ArtifactMeta> {
        Ok(ArtifactMeta {
            tool: "spinestat".to_string(),
            tool_version: sp_core::VERSION.to_string(),
            created_unix_ms: now_unix_ms()?,
            title: self.title.clone(),
            samples: self.samples.clone(),
            exposure: self.exposure,
            exposure_label: self.exposure.and_then(exposure_label),
        })
    }
}

/// Common header of every artifact.
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactMeta {
    pub tool: String,
    pub tool_version: String,
    pub created_unix_ms: u128,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub samples: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exposure: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exposure_label: Option<String>,
}

fn now_unix_ms() -> Result<u128> {
    let d = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| sp_core::Error::Computation(format!("system time error: {}", e)))?;
    Ok(d.as_millis())
}

/// `"2.51×10^20 POT"` style label; `None` for non-positive exposure.
pub fn exposure_label(exposure: f64) -> Option<String> {
    if !exposure.is_finite() || exposure <= 0.0 {
        return None;
    }
    let mut mag = exposure.log10().floor() as i32;
    let mut mantissa = exposure / 10f64.powi(mag);
    // 9.999e19 would print as 10.00×10^19
    if format!("{:.2}", mantissa) == "10.00" {
        mag += 1;
        mantissa /= 10.0;
    }
    Some(format!("{:.2}×10^{} POT", mantissa, mag))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exposure_label() {
        assert_eq!(exposure_label(2.51e20).as_deref(), Some("2.51×10^20 POT"));
        assert_eq!(exposure_label(1.0e19).as_deref(), Some("1.00×10^19 POT"));
        assert_eq!(exposure_label(9.9999e19).as_deref(), Some("1.00×10^20 POT"));
        assert_eq!(exposure_label(0.0), None);
    }

    #[test]
    fn test_first_positive_exposure_wins() {
        let mut meta = ArtistMeta::new(Some("t".into()));
        meta.record(&Sample::new("offbeam", vec![], 0.0, 10.0));
        meta.record(&Sample::new("mc_nu", vec![], 3.0e20, 1.0));
        meta.record(&Sample::new("mc_cos", vec![], 1.0e18, 1.0));
        assert_eq!(meta.exposure(), Some(3.0e20));
        assert_eq!(meta.title(), Some("t"));
        let m = meta.to_artifact_meta().unwrap();
        assert_eq!(m.samples, vec!["offbeam", "mc_nu", "mc_cos"]);
        assert_eq!(m.exposure_label.as_deref(), Some("3.00×10^20 POT"));
    }
}
