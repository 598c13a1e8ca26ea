//! Confusion-matrix accumulation and row-normalised views.
//!
//! Accumulation policy:
//! - events whose true category is not registered are discarded (counted in
//!   [`AccumulateSummary::unknown_true_category`], never an error);
//! - absent or unregistered predictions are booked under the null category;
//! - events with a negative or non-finite weight are discarded.
//!
//! Every accepted event adds its weight to exactly one cell, so accumulation
//! is associative and commutative and partial accumulators can be merged.

use serde::Serialize;
use sp_core::{CategoryKey, Error, EventRecord, Result, NULL_CATEGORY};

use crate::registry::CategoryRegistry;

/// Per-batch accounting returned by [`ConfusionAccumulator::accumulate`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AccumulateSummary {
    /// Events booked into a cell.
    pub accepted: u64,
    /// Accepted events whose prediction was absent or unregistered.
    pub remapped_to_null: u64,
    /// Events dropped because the true category is not registered.
    pub unknown_true_category: u64,
    /// Events dropped because of a negative or non-finite weight.
    pub invalid_weight: u64,
}

impl AccumulateSummary {
    /// Events dropped for any reason.
    pub fn discarded(&self) -> u64 {
        self.unknown_true_category + self.invalid_weight
    }

    /// Every event seen, accepted or not.
    pub fn seen(&self) -> u64 {
        self.accepted + self.discarded()
    }

    fn add(&mut self, other: &AccumulateSummary) {
        self.accepted += other.accepted;
        self.remapped_to_null += other.remapped_to_null;
        self.unknown_true_category += other.unknown_true_category;
        self.invalid_weight += other.invalid_weight;
    }
}

/// Square matrix of (weighted) counts indexed by `(true, predicted)` key pairs.
#[derive(Debug, Clone)]
pub struct ConfusionAccumulator {
    registry: CategoryRegistry,
    /// Row-major `n x n`, rows = true category, columns = predicted.
    counts: Vec<f64>,
    totals: AccumulateSummary,
}

impl ConfusionAccumulator {
    /// Zero matrix over the registry's keys. The null category is ensured here.
    pub fn new(mut registry: CategoryRegistry) -> Self {
        registry.ensure_null_category();
        let n = registry.len();
        Self { registry, counts: vec![0.0; n * n], totals: AccumulateSummary::default() }
    }

    /// Registry backing the matrix (null category included).
    pub fn registry(&self) -> &CategoryRegistry {
        &self.registry
    }

    /// Matrix dimension.
    pub fn dim(&self) -> usize {
        self.registry.len()
    }

    /// Book a batch of events.
    pub fn accumulate<'a, I>(&mut self, events: I) -> AccumulateSummary
    where
        I: IntoIterator<Item = &'a EventRecord>,
    {
        let n = self.dim();
        let null_idx = self.registry.index_of(NULL_CATEGORY).unwrap_or(n - 1);
        let mut summary = AccumulateSummary::default();

        for ev in events {
            let Some(row) = self.registry.index_of(ev.true_category) else {
                summary.unknown_true_category += 1;
                continue;
            };
            if !ev.weight.is_finite() || ev.weight < 0.0 {
                summary.invalid_weight += 1;
                continue;
            }
            let col = match ev.predicted_category.and_then(|k| self.registry.index_of(k)) {
                Some(c) => c,
                None => {
                    summary.remapped_to_null += 1;
                    null_idx
                }
            };
            self.counts[row * n + col] += ev.weight;
            summary.accepted += 1;
        }

        if summary.discarded() > 0 {
            log::warn!(
                "confusion: discarded {} events ({} unknown true category, {} invalid weight)",
                summary.discarded(),
                summary.unknown_true_category,
                summary.invalid_weight
            );
        }
        log::debug!(
            "confusion: accepted {} events ({} with null prediction)",
            summary.accepted,
            summary.remapped_to_null
        );

        self.totals.add(&summary);
        summary
    }

    /// Add another accumulator's counts. Both must share the same key order.
    pub fn merge(&mut self, other: &ConfusionAccumulator) -> Result<()> {
        if self.registry.keys() != other.registry.keys() {
            return Err(Error::Validation(format!(
                "cannot merge confusion matrices with different keys: {:?} vs {:?}",
                self.registry.keys(),
                other.registry.keys()
            )));
        }
        for (dst, src) in self.counts.iter_mut().zip(other.counts.iter()) {
            *dst += *src;
        }
        self.totals.add(&other.totals);
        Ok(())
    }

    /// Accounting over every batch seen so far (merges included).
    pub fn totals(&self) -> AccumulateSummary {
        self.totals
    }

    /// Raw row-major counts.
    pub fn counts(&self) -> &[f64] {
        &self.counts
    }

    /// Count in cell `(true_key, predicted_key)`.
    pub fn count(&self, true_key: CategoryKey, predicted_key: CategoryKey) -> Option<f64> {
        let r = self.registry.index_of(true_key)?;
        let c = self.registry.index_of(predicted_key)?;
        Some(self.counts[r * self.dim() + c])
    }

    /// Raw row for `true_key`, in registry column order.
    pub fn row(&self, true_key: CategoryKey) -> Option<&[f64]> {
        let n = self.dim();
        let r = self.registry.index_of(true_key)?;
        Some(&self.counts[r * n..(r + 1) * n])
    }

    /// Row-normalised projection.
    ///
    /// The null true-label row is removed; the null predicted column is kept
    /// only when `show_null_column` is set. Rows summing to zero stay zero.
    /// Rows come out in reverse registry order (top-to-bottom reading when
    /// drawn), columns in registry order.
    pub fn normalized_view(&self, show_null_column: bool) -> NormalizedView {
        let n = self.dim();
        let cats = self.registry.categories();

        let col_idx: Vec<usize> = (0..n)
            .filter(|&j| show_null_column || cats[j].key != NULL_CATEGORY)
            .collect();
        let row_idx: Vec<usize> = (0..n).rev().filter(|&i| cats[i].key != NULL_CATEGORY).collect();

        let mut values = Vec::with_capacity(row_idx.len());
        let mut row_totals = Vec::with_capacity(row_idx.len());
        for &i in &row_idx {
            let row: Vec<f64> = col_idx.iter().map(|&j| self.counts[i * n + j]).collect();
            let sum: f64 = row.iter().sum();
            let normed = if sum > 0.0 { row.iter().map(|v| v / sum).collect() } else { row };
            values.push(normed);
            row_totals.push(sum);
        }

        NormalizedView {
            row_keys: row_idx.iter().map(|&i| cats[i].key).collect(),
            row_labels: row_idx.iter().map(|&i| cats[i].name.clone()).collect(),
            column_keys: col_idx.iter().map(|&j| cats[j].key).collect(),
            column_labels: col_idx.iter().map(|&j| cats[j].name.clone()).collect(),
            values,
            row_totals,
        }
    }
}

/// Read-only, row-normalised projection of a confusion matrix.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedView {
    /// True-category keys, one per row (reverse registry order).
    pub row_keys: Vec<CategoryKey>,
    /// True-category names, aligned with `row_keys`.
    pub row_labels: Vec<String>,
    /// Predicted-category keys, one per column (registry order).
    pub column_keys: Vec<CategoryKey>,
    /// Predicted-category names, aligned with `column_keys`.
    pub column_labels: Vec<String>,
    /// `values[r][c]` in `[0, 1]`; each non-empty row sums to 1.
    pub values: Vec<Vec<f64>>,
    /// Pre-normalisation row sums over the shown columns.
    pub row_totals: Vec<f64>,
}

impl NormalizedView {
    /// Normalised cell `(true_key, predicted_key)`, if both are shown.
    pub fn get(&self, true_key: CategoryKey, predicted_key: CategoryKey) -> Option<f64> {
        let r = self.row_keys.iter().position(|&k| k == true_key)?;
        let c = self.column_keys.iter().position(|&k| k == predicted_key)?;
        Some(self.values[r][c])
    }

    /// Normalised row for `true_key`.
    pub fn row(&self, true_key: CategoryKey) -> Option<&[f64]> {
        let r = self.row_keys.iter().position(|&k| k == true_key)?;
        Some(&self.values[r])
    }

    /// Largest cell value (0 for an empty view).
    pub fn max_value(&self) -> f64 {
        self.values.iter().flatten().copied().fold(0.0, f64::max)
    }
}
