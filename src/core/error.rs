//! Error types for gazeblur.
//!
//! Uses thiserror for structured errors with context. Every failure is
//! returned to the direct caller; the UI layer decides how to present it.

use crate::core::types::{AttributeType, Dimensions};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for a filter instance.
///
/// Two instances of the same filter type (same `name`) have distinct IDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterId(pub Uuid);

impl FilterId {
    /// Create a new random filter ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for FilterId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FilterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// Which of the two stack collections an operation refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StackSide {
    /// Filters not in the stack
    Available,
    /// The ordered stack that runs
    Active,
}

impl fmt::Display for StackSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StackSide::Available => write!(f, "available"),
            StackSide::Active => write!(f, "active"),
        }
    }
}

/// Top-level error type for gazeblur.
#[derive(Error, Debug)]
pub enum GazeError {
    /// Running the stack failed
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// An attribute read or write failed
    #[error("Attribute error: {0}")]
    Attribute(#[from] AttributeError),

    /// A stack edit failed
    #[error("Stack error: {0}")]
    Stack(#[from] StackError),

    /// A heatmap or remap curve was rejected
    #[error("Heatmap error: {0}")]
    Heatmap(#[from] HeatmapError),

    /// The session config could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Filesystem failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Decoding or encoding failure
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Errors from running the filter stack.
#[derive(Error, Debug, Clone)]
pub enum PipelineError {
    /// Image and heatmap sizes differ
    #[error("Heatmap is {heatmap} but image is {image}")]
    DimensionMismatch {
        /// Source image size
        image: Dimensions,
        /// Heatmap size
        heatmap: Dimensions,
    },

    /// An instance holds a value its declaration rejects
    #[error("Filter '{filter}' has an invalid attribute: {error}")]
    InvalidAttribute {
        /// Filter name
        filter: String,
        /// Validation failure
        error: AttributeError,
    },

    /// A filter read an attribute the instance does not hold
    #[error("Missing attribute '{attribute}' for filter {filter_id}")]
    MissingAttribute {
        /// Instance id
        filter_id: FilterId,
        /// Attribute name
        attribute: String,
    },

    #[error("Filter '{filter}' ({filter_id}) failed: {error}")]
    /// A filter returned an error
    FilterFailed {
        /// Instance id
        filter_id: FilterId,
        /// Filter name
        filter: String,
        /// Failure message
        error: String,
    },

    #[error("Filter '{filter}' returned a {got} image for a {expected} input")]
    /// A filter changed the image size
    OutputDimensions {
        /// Filter name
        filter: String,
        /// Input size
        expected: Dimensions,
        /// Returned size
        got: Dimensions,
    },

    /// The session has no source image
    #[error("No source image loaded")]
    NoSourceImage,

    /// The session has no heatmap
    #[error("No heatmap loaded")]
    NoHeatmap,

    /// No successful run has produced an output
    #[error("Nothing has been rendered yet")]
    NoOutput,
}

/// Errors from reading or writing filter attributes.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AttributeError {
    /// The filter declares no such attribute
    #[error("Filter '{filter}' has no attribute '{attribute}'")]
    Unknown {
        /// Filter name
        filter: String,
        /// Requested attribute
        attribute: String,
    },

    /// The value has the wrong type
    #[error("Attribute '{attribute}' expects {expected}, got {got}")]
    TypeMismatch {
        /// Attribute name
        attribute: String,
        /// Declared type
        expected: AttributeType,
        /// Type of the rejected value
        got: AttributeType,
    },

    /// The value breaks a constraint
    #[error("Attribute '{attribute}': {error}")]
    OutOfDomain {
        /// Attribute name
        attribute: String,
        /// Constraint that failed
        error: String,
    },
}

/// Errors from available/active stack management.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StackError {
    /// The list has no selection
    #[error("No filter selected in the {0} list")]
    NoSelection(StackSide),

    /// Position past the end of a list
    #[error("Index {index} is out of range for the {side} list of length {len}")]
    IndexOutOfRange {
        /// List indexed
        side: StackSide,
        /// Requested position
        index: usize,
        /// List length
        len: usize,
    },

    /// No list holds this instance
    #[error("Filter {0} is not part of this stack")]
    UnknownFilter(FilterId),
}

/// Errors from heatmap construction and remapping.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HeatmapError {
    /// Weight count does not match the grid
    #[error("A {dimensions} heatmap needs {expected} weights, got {got}")]
    BufferSize {
        /// Requested grid size
        dimensions: Dimensions,
        /// `width * height`
        expected: usize,
        /// Weights supplied
        got: usize,
    },

    /// A remap curve parameter is not finite or out of range
    #[error("Invalid remap curve parameter '{parameter}': {error}")]
    InvalidCurve {
        /// Curve parameter name
        parameter: String,
        /// Why it was rejected
        error: String,
    },
}

/// Errors from loading session configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read
    #[error("Failed to read config {path}: {error}")]
    Read {
        /// Config file
        path: PathBuf,
        /// Underlying failure
        error: std::io::Error,
    },

    /// The file is not valid config TOML
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

// ============================================================================
// Error Utilities
// ============================================================================

impl PipelineError {
    /// Get the filter instance that caused this error, if applicable.
    pub fn filter_id(&self) -> Option<FilterId> {
        match self {
            PipelineError::MissingAttribute { filter_id, .. }
            | PipelineError::FilterFailed { filter_id, .. } => Some(*filter_id),
            _ => None,
        }
    }

    /// Get suggestion for fixing this error.
    pub fn suggested_fix(&self) -> Option<String> {
        match self {
            PipelineError::DimensionMismatch { image, .. } => Some(format!(
                "Provide a heatmap of exactly {} pixels",
                image
            )),
            PipelineError::InvalidAttribute { filter, error } => match error {
                AttributeError::OutOfDomain { attribute, .. } => {
                    Some(format!("Adjust '{}' on '{}'", attribute, filter))
                }
                _ => None,
            },
            PipelineError::NoSourceImage => Some("Load an image first".to_string()),
            PipelineError::NoHeatmap => Some("Load a heatmap first".to_string()),
            PipelineError::NoOutput => Some("Render before saving".to_string()),
            _ => None,
        }
    }
}

/// Result type alias for gazeblur operations.
pub type GazeResult<T> = Result<T, GazeError>;

/// Result type alias for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Result type alias for attribute operations.
pub type AttributeResult<T> = Result<T, AttributeError>;

/// Result type alias for stack operations.
pub type StackResult<T> = Result<T, StackError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_id_display() {
        let id = FilterId::new();
        let display = format!("{}", id);
        assert_eq!(display.len(), 8);
    }

    #[test]
    fn test_dimension_mismatch_message() {
        let error = PipelineError::DimensionMismatch {
            image: Dimensions::new(4, 3),
            heatmap: Dimensions::new(2, 2),
        };
        assert_eq!(error.to_string(), "Heatmap is 2x2 but image is 4x3");
        assert!(error.suggested_fix().unwrap().contains("4x3"));
        assert_eq!(error.filter_id(), None);
    }

    #[test]
    fn test_errors_convert_to_top_level() {
        let error: GazeError = StackError::NoSelection(StackSide::Active).into();
        assert!(matches!(error, GazeError::Stack(_)));
        assert!(error.to_string().contains("active"));
    }
}
