//! Ordered category registry.
//!
//! Insertion order defines the row/column order of every matrix built from
//! the registry.

use std::collections::HashMap;

use serde::Serialize;
use sp_core::{CategoryKey, Error, Result, NULL_CATEGORY, NULL_CATEGORY_NAME};

/// A category key with its display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    /// Integer key.
    pub key: CategoryKey,
    /// Display name.
    pub name: String,
}

/// Ordered mapping from category key to display name.
#[derive(Debug, Clone, Default)]
pub struct CategoryRegistry {
    categories: Vec<Category>,
    index: HashMap<CategoryKey, usize>,
}

impl CategoryRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(key, name)` pairs in order.
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (CategoryKey, S)>,
        S: Into<String>,
    {
        let mut reg = Self::new();
        for (key, name) in pairs {
            reg.register(key, name)?;
        }
        Ok(reg)
    }

    /// Add a category. Fails with [`Error::DuplicateKey`] if `key` is taken.
    ///
    /// [`NULL_CATEGORY`] is reserved; it only enters through
    /// [`CategoryRegistry::ensure_null_category`] so it is always named
    /// [`NULL_CATEGORY_NAME`].
    pub fn register(&mut self, key: CategoryKey, name: impl Into<String>) -> Result<()> {
        if key == NULL_CATEGORY {
            return Err(Error::Validation(format!(
                "category key {} is reserved for missing predictions",
                NULL_CATEGORY
            )));
        }
        if self.index.contains_key(&key) {
            return Err(Error::DuplicateKey(key));
        }
        self.index.insert(key, self.categories.len());
        self.categories.push(Category { key, name: name.into() });
        Ok(())
    }

    /// Insert the reserved null category if it is not present yet.
    pub fn ensure_null_category(&mut self) {
        if !self.contains(NULL_CATEGORY) {
            self.index.insert(NULL_CATEGORY, self.categories.len());
            self.categories
                .push(Category { key: NULL_CATEGORY, name: NULL_CATEGORY_NAME.to_string() });
        }
    }

    /// All keys in insertion order (null included once registered).
    pub fn keys(&self) -> Vec<CategoryKey> {
        self.categories.iter().map(|c| c.key).collect()
    }

    /// Categories in insertion order.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Position of `key` in insertion order.
    pub fn index_of(&self, key: CategoryKey) -> Option<usize> {
        self.index.get(&key).copied()
    }

    /// Display name of `key`.
    pub fn name(&self, key: CategoryKey) -> Option<&str> {
        self.index_of(key).map(|i| self.categories[i].name.as_str())
    }

    /// Whether `key` is registered.
    pub fn contains(&self, key: CategoryKey) -> bool {
        self.index.contains_key(&key)
    }

    /// Number of categories.
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// True if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}
