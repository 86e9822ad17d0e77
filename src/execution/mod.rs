//! Pipeline execution module.
//!
//! This module handles running a filter stack over an image.

pub mod pipeline;
pub mod progress;

pub use pipeline::{FilterPipeline, PipelineOptions, RunStats};
pub use progress::{ProgressCallback, ProgressTracker, ProgressUpdate};
