//! Core types and traits for the gazeblur filter system.
//!
//! This module contains the foundational pieces of the pipeline:
//! - Image, heatmap and attribute value types
//! - Attribute definitions and constraints
//! - The filter trait, its metadata and configured instances
//! - Heatmap-weighted blending helpers
//! - Error types

pub mod types;
pub mod attribute;
pub mod error;
pub mod context;
pub mod filter;
pub mod instance;
pub mod blend;

// Re-export commonly used types
pub use types::{Attributes, AttributeType, Dimensions, Heatmap, Image, Value, NORMALIZED};
pub use attribute::{AttributeDefinition, Constraint};
pub use error::{AttributeError, FilterId, GazeError, HeatmapError, PipelineError, StackError};
pub use context::FilterContext;
pub use filter::{Category, Filter, FilterMetadata};
pub use instance::FilterInstance;
