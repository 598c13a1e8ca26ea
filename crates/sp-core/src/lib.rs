//! # sp-core
//!
//! Shared building blocks for spinestat: the error type, labeled event
//! records, and exposure-normalised samples keyed by their analysis role.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod types;
pub mod yaml;

pub use error::{Error, Result};
pub use types::{
    resolve_prediction, CategoryKey, EventRecord, Sample, SampleRole, SampleSet, NULL_CATEGORY,
    NULL_CATEGORY_NAME,
};
pub use yaml::{from_yaml_slice, from_yaml_str};

/// Crate version, stamped into emitted artifacts.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
