//! Heatmap remapping.
//!
//! Raw attention data rarely makes a good blend mask as-is. The remapper
//! reshapes it with a [`RemapCurve`] (or any [`RemapStrategy`]), optionally
//! inverts it, and clamps the result to [0, 1].

pub mod curve;
pub mod remapper;

pub use curve::{RemapConfig, RemapCurve, RemapStrategy};
pub use remapper::{remap, remap_with, HeatmapRemapper};
