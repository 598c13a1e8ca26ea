//! Cut-flow results and their printed summary lines.
//!
//! Line contract (parsed downstream, order matters):
//! ```text
//! No Cut Efficiency: 1.000
//! <cut name> Efficiency: <value:.4>
//! ```
//! and the same for purity (baseline also at 4 decimals). Undefined values
//! print as `undefined`.

use std::fmt;

use serde::Serialize;

/// Label of the zero-cut baseline line.
pub const BASELINE_LABEL: &str = "No Cut";

/// Text printed for an undefined ratio.
pub const UNDEFINED: &str = "undefined";

/// Which ratio a report carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Quantity {
    /// selected / total on the signal sample
    Efficiency,
    /// matched / (scaled simulation + scaled background)
    Purity,
}

impl Quantity {
    fn baseline_decimals(self) -> usize {
        match self {
            Quantity::Efficiency => 3,
            Quantity::Purity => 4,
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quantity::Efficiency => f.write_str("Efficiency"),
            Quantity::Purity => f.write_str("Purity"),
        }
    }
}

/// Format an optional ratio with a fixed number of decimals.
pub fn format_ratio(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.*}", decimals, v),
        _ => UNDEFINED.to_string(),
    }
}

/// Ratio after one cumulative cut.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CutValue {
    /// Cut name.
    pub name: String,
    /// Ratio, `None` when undefined.
    pub value: Option<f64>,
}

/// Baseline plus one value per cut, in declared order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CutFlowReport {
    /// Efficiency or purity.
    pub quantity: Quantity,
    /// Ratio before any cut.
    pub baseline: Option<f64>,
    /// Ratio after each cumulative cut.
    pub stages: Vec<CutValue>,
}

impl CutFlowReport {
    /// `(name, value)` pairs with the baseline first.
    pub fn pairs(&self) -> Vec<(String, Option<f64>)> {
        std::iter::once((BASELINE_LABEL.to_string(), self.baseline))
            .chain(self.stages.iter().map(|s| (s.name.clone(), s.value)))
            .collect()
    }

    /// Printable lines, baseline first.
    pub fn summary_lines(&self) -> Vec<String> {
        self.pairs()
            .into_iter()
            .enumerate()
            .map(|(i, (name, value))| {
                let decimals = if i == 0 { self.quantity.baseline_decimals() } else { 4 };
                format!("{} {}: {}", name, self.quantity, format_ratio(value, decimals))
            })
            .collect()
    }
}
