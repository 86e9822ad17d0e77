//! Filter execution context.
//!
//! The context gives a filter read access to the image, the heatmap and its
//! attribute values for one call to `run`.

use crate::core::blend;
use crate::core::error::{FilterId, PipelineError, PipelineResult};
use crate::core::types::{Attributes, Heatmap, Image, Value};

/// Context provided to [`Filter::run`](crate::core::filter::Filter::run).
#[derive(Debug, Clone, Copy)]
pub struct FilterContext<'a> {
    /// ID of the filter instance being executed.
    pub filter_id: FilterId,
    /// Type identifier of the filter being executed.
    pub filter_name: &'a str,
    image: &'a Image,
    heatmap: &'a Heatmap,
    attributes: &'a Attributes,
    parallel: bool,
}

impl<'a> FilterContext<'a> {
    /// Create a new context. Dimensions are checked by the caller.
    pub fn new(
        filter_id: FilterId,
        filter_name: &'a str,
        image: &'a Image,
        heatmap: &'a Heatmap,
        attributes: &'a Attributes,
    ) -> Self {
        Self {
            filter_id,
            filter_name,
            image,
            heatmap,
            attributes,
            parallel: true,
        }
    }

    /// Enable or disable row-parallel pixel loops.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// The input image.
    pub fn image(&self) -> &'a Image {
        self.image
    }

    /// The adjusted heatmap for this run.
    pub fn heatmap(&self) -> &'a Heatmap {
        self.heatmap
    }

    /// Whether pixel loops may use the rayon pool.
    pub fn parallel(&self) -> bool {
        self.parallel
    }

    /// Get all attributes.
    pub fn attributes(&self) -> &'a Attributes {
        self.attributes
    }

    // ========================================================================
    // Attribute Getters
    // ========================================================================

    /// Get an attribute value by name.
    pub fn get_attribute(&self, name: &str) -> PipelineResult<&'a Value> {
        self.attributes
            .get(name)
            .ok_or_else(|| PipelineError::MissingAttribute {
                filter_id: self.filter_id,
                attribute: name.to_string(),
            })
    }

    /// Get an attribute as an integer.
    pub fn get_integer(&self, name: &str) -> PipelineResult<i64> {
        self.get_attribute(name)?
            .as_integer()
            .ok_or_else(|| self.failure(format!("Attribute '{}' is not an integer", name)))
    }

    /// Get an attribute as a float.
    pub fn get_float(&self, name: &str) -> PipelineResult<f64> {
        self.get_attribute(name)?
            .as_float()
            .ok_or_else(|| self.failure(format!("Attribute '{}' is not a float", name)))
    }

    /// Build a [`PipelineError::FilterFailed`] for this filter.
    pub fn failure(&self, error: impl Into<String>) -> PipelineError {
        PipelineError::FilterFailed {
            filter_id: self.filter_id,
            filter: self.filter_name.to_string(),
            error: error.into(),
        }
    }

    // ========================================================================
    // Pixel Helpers
    // ========================================================================

    /// Map the input through `f(index, rgb, weight)`; see [`blend::map_weighted`].
    pub fn map_weighted<F>(&self, f: F) -> Image
    where
        F: Fn(usize, [u8; 3], f32) -> [u8; 3] + Sync,
    {
        blend::map_weighted(self.image, self.heatmap, self.parallel, f)
    }

    /// Blend the input towards a fully degraded copy of it.
    pub fn blend_with(&self, degraded: &Image) -> Image {
        blend::blend(self.image, degraded, self.heatmap, self.parallel)
    }
}
