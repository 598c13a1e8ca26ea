//! Analysis config (YAML, or JSON by extension) parsing + semantic validation.

use anyhow::Result;
use serde::Deserialize;
use sp_core::{CategoryKey, SampleRole};
use sp_eval::{
    BinnedEfficiencyEstimator, Binning, CategoryRegistry, Cut, CutFlow, Predicate,
};
use sp_prob::{IntervalMethod, DEFAULT_CONFIDENCE_LEVEL};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    /// Categories in display order.
    pub categories: Vec<CategoryEntry>,

    /// Event-table files per sample role (relative to the config file).
    #[serde(default)]
    pub samples: BTreeMap<SampleRole, Vec<PathBuf>>,

    /// Full selection applied to the signal sample.
    #[serde(default = "default_selection")]
    pub selection: Predicate,

    /// Which simulated events count as genuine signal for purity.
    #[serde(default = "default_foreground")]
    pub foreground: Predicate,

    /// Sequential cuts, in order.
    #[serde(default)]
    pub cuts: Vec<Cut>,

    #[serde(default)]
    pub variables: BTreeMap<String, VariableConfig>,

    #[serde(default)]
    pub interval: IntervalConfig,

    #[serde(default)]
    pub confusion: ConfusionConfig,

    /// Directory relative sample paths resolve against (set by `read_config`).
    #[serde(skip)]
    pub base_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryEntry {
    pub key: CategoryKey,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VariableConfig {
    /// Display bin edges `[lo, ..., hi]`.
    pub range: Vec<f64>,
    /// Number of uniform efficiency bins over `[lo, hi]`.
    pub nbins: usize,
    #[serde(default)]
    pub xlabel: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IntervalConfig {
    #[serde(default)]
    pub method: IntervalMethod,
    #[serde(default = "default_confidence_level")]
    pub confidence_level: f64,
}

impl Default for IntervalConfig {
    fn default() -> Self {
        Self { method: IntervalMethod::default(), confidence_level: DEFAULT_CONFIDENCE_LEVEL }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfusionConfig {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub xlabel: Option<String>,
    #[serde(default)]
    pub ylabel: Option<String>,
}

fn default_selection() -> Predicate {
    Predicate::flag("reco_all_cuts_satisfied")
}

fn default_foreground() -> Predicate {
    Predicate::TrueCategory(0)
}

fn default_confidence_level() -> f64 {
    DEFAULT_CONFIDENCE_LEVEL
}

pub fn read_config(path: &Path) -> Result<AnalysisConfig> {
    let bytes = std::fs::read(path)?;
    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("").to_ascii_lowercase();
    let mut cfg: AnalysisConfig = if ext == "json" {
        serde_json::from_slice(&bytes)?
    } else {
        // Default: YAML, enum variants as single-key maps.
        sp_core::from_yaml_slice(&bytes)?
    };
    cfg.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
    cfg.validate()?;
    Ok(cfg)
}

impl AnalysisConfig {
    /// Fail fast on configuration errors before any sample is read.
    pub fn validate(&self) -> Result<()> {
        self.registry()?;
        self.cut_flow()?;
        for (name, var) in &self.variables {
            Binning::new(var.range.clone())
                .map_err(|e| anyhow::anyhow!("variable '{}': {}", name, e))?;
            if var.nbins == 0 {
                anyhow::bail!("variable '{}': nbins must be > 0", name);
            }
        }
        let cl = self.interval.confidence_level;
        if !(cl > 0.0 && cl < 1.0) {
            anyhow::bail!("interval.confidence_level must be in (0, 1), got {}", cl);
        }
        Ok(())
    }

    /// Registry in declared order. The reserved null key may not be declared.
    pub fn registry(&self) -> Result<CategoryRegistry> {
        let mut reg = CategoryRegistry::new();
        for c in &self.categories {
            reg.register(c.key, c.name.clone())?;
        }
        Ok(reg)
    }

    pub fn cut_flow(&self) -> Result<CutFlow> {
        Ok(CutFlow::new(self.cuts.clone())?)
    }

    /// Files for `role`, resolved against the config directory.
    pub fn sample_paths(&self, role: SampleRole) -> Option<Vec<PathBuf>> {
        self.samples
            .get(&role)
            .map(|paths| paths.iter().map(|p| self.base_dir.join(p)).collect())
    }

    pub fn variable(&self, name: &str) -> Result<&VariableConfig> {
        self.variables.get(name).ok_or_else(|| {
            let known: Vec<&str> = self.variables.keys().map(String::as_str).collect();
            anyhow::anyhow!("unknown variable '{}' (configured: {:?})", name, known)
        })
    }

    /// Efficiency estimator for `name`, optionally overriding the bin count.
    pub fn estimator(&self, name: &str, nbins: Option<usize>) -> Result<BinnedEfficiencyEstimator> {
        let var = self.variable(name)?;
        let est = BinnedEfficiencyEstimator::new(
            name,
            &var.range,
            nbins.unwrap_or(var.nbins),
            self.selection.clone(),
        )?
        .with_interval(self.interval.method, self.interval.confidence_level)?;
        Ok(est)
    }
}
