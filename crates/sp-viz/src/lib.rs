//! # sp-viz
//!
//! Plot-friendly artifacts for spinestat.
//!
//! Drawing itself happens downstream; this crate turns accumulated statistics
//! into JSON structures (arrays instead of nested objects) behind the
//! [`Artist`] capability trait.

#![warn(clippy::all)]

/// `Artist` trait and shared title/exposure bookkeeping.
pub mod artist;

/// Confusion-matrix heatmap artifacts.
pub mod confusion;

/// Efficiency-vs-variable artifacts.
pub mod efficiency;

pub use artist::{exposure_label, ArtifactMeta, Artist, ArtistMeta};
pub use confusion::{ConfusionArtifact, ConfusionArtist};
pub use efficiency::{EfficiencyArtifact, EfficiencyArtist};
