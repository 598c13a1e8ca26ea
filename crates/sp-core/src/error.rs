//! Error types for spinestat

use thiserror::Error;

use crate::types::{CategoryKey, SampleRole};

/// spinestat error type
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// A category key was registered twice
    #[error("duplicate category key: {0}")]
    DuplicateKey(CategoryKey),

    /// Bin layout is not a strictly increasing, non-empty set of edges
    #[error("invalid binning: {0}")]
    InvalidBinning(String),

    /// A sample role required by a computation was never loaded
    #[error("missing sample for role '{0}'")]
    MissingSample(SampleRole),

    /// Computation error
    #[error("Computation error: {0}")]
    Computation(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
