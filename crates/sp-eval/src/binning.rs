//! Bin layouts over a continuous variable.
//!
//! Bins are half-open `[lower, upper)` except the last one, which also holds
//! its upper edge. Values outside `[lo, hi]` (and non-finite values) fall in
//! no bin.

use serde::Serialize;
use sp_core::{Error, Result};

/// One bin of a layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bin {
    /// Lower edge (inclusive).
    pub lower: f64,
    /// Upper edge (exclusive except for the last bin).
    pub upper: f64,
    /// Midpoint.
    pub center: f64,
}

impl Bin {
    /// Bin width.
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}

/// Strictly increasing bin edges.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Binning {
    edges: Vec<f64>,
}

impl Binning {
    /// Layout from explicit edges (at least two, finite, strictly increasing).
    pub fn new(edges: Vec<f64>) -> Result<Self> {
        if edges.len() < 2 {
            return Err(Error::InvalidBinning(format!(
                "need at least 2 edges, got {}",
                edges.len()
            )));
        }
        if let Some(bad) = edges.iter().find(|e| !e.is_finite()) {
            return Err(Error::InvalidBinning(format!("edge must be finite, got {}", bad)));
        }
        if let Some(w) = edges.windows(2).find(|w| w[0] >= w[1]) {
            return Err(Error::InvalidBinning(format!(
                "edges must be strictly increasing, got {} >= {}",
                w[0], w[1]
            )));
        }
        Ok(Self { edges })
    }

    /// `nbins` equal-width bins spanning `[lo, hi]`.
    pub fn uniform(lo: f64, hi: f64, nbins: usize) -> Result<Self> {
        if nbins == 0 {
            return Err(Error::InvalidBinning("nbins must be > 0".to_string()));
        }
        if !lo.is_finite() || !hi.is_finite() || lo >= hi {
            return Err(Error::InvalidBinning(format!(
                "range must satisfy lo < hi, got [{}, {}]",
                lo, hi
            )));
        }
        let step = (hi - lo) / nbins as f64;
        let mut edges: Vec<f64> = (0..nbins).map(|i| lo + step * i as f64).collect();
        edges.push(hi);
        Self::new(edges)
    }

    /// Edges (length `n_bins() + 1`).
    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    /// Number of bins.
    pub fn n_bins(&self) -> usize {
        self.edges.len() - 1
    }

    /// First edge.
    pub fn lo(&self) -> f64 {
        self.edges[0]
    }

    /// Last edge.
    pub fn hi(&self) -> f64 {
        self.edges[self.edges.len() - 1]
    }

    /// Whether `x` lies in `[lo, hi]`.
    pub fn contains(&self, x: f64) -> bool {
        x.is_finite() && x >= self.lo() && x <= self.hi()
    }

    /// Bin `i`, if it exists.
    pub fn bin(&self, i: usize) -> Option<Bin> {
        if i >= self.n_bins() {
            return None;
        }
        let (lower, upper) = (self.edges[i], self.edges[i + 1]);
        Some(Bin { lower, upper, center: 0.5 * (lower + upper) })
    }

    /// All bins in increasing order.
    pub fn bins(&self) -> Vec<Bin> {
        (0..self.n_bins()).filter_map(|i| self.bin(i)).collect()
    }

    /// Index of the bin holding `x`.
    pub fn find_bin(&self, x: f64) -> Option<usize> {
        if !self.contains(x) {
            return None;
        }
        if x == self.hi() {
            return Some(self.n_bins() - 1);
        }
        // First edge strictly above x closes the bin.
        let above = self.edges.partition_point(|&e| e <= x);
        Some(above - 1)
    }
}
