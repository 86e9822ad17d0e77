//! Configured filter instances.
//!
//! A [`FilterInstance`] pairs a filter implementation with its own attribute
//! values and a unique ID. This is the unit the stack moves between the
//! available and active lists and the unit the pipeline runs.

use crate::core::context::FilterContext;
use crate::core::error::{AttributeError, AttributeResult, FilterId, PipelineError, PipelineResult};
use crate::core::filter::{Filter, FilterMetadata};
use crate::core::types::{Attributes, Dimensions, Heatmap, Image, Value};

/// A filter together with its current attribute values.
#[derive(Clone)]
pub struct FilterInstance {
    /// Unique identifier
    pub id: FilterId,
    filter: Box<dyn Filter>,
    metadata: FilterMetadata,
    attributes: Attributes,
}

impl std::fmt::Debug for FilterInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterInstance")
            .field("id", &self.id)
            .field("filter", &self.metadata.id)
            .field("attributes", &self.attributes)
            .finish()
    }
}

impl FilterInstance {
    /// Wrap a filter, starting every attribute at its declared default.
    pub fn new(filter: Box<dyn Filter>) -> Self {
        let metadata = filter.metadata();
        let attributes = metadata.default_attributes();
        Self {
            id: FilterId::new(),
            filter,
            metadata,
            attributes,
        }
    }

    /// Set an attribute, consuming and returning the instance.
    pub fn with_attribute(mut self, name: &str, value: Value) -> AttributeResult<Self> {
        self.set_attribute(name, value)?;
        Ok(self)
    }

    /// Stable type identifier, e.g. `"gaussian_blur"`.
    pub fn name(&self) -> &str {
        &self.metadata.id
    }

    /// Human-readable name.
    pub fn display_name(&self) -> &str {
        &self.metadata.name
    }

    /// Metadata of the wrapped filter.
    pub fn metadata(&self) -> &FilterMetadata {
        &self.metadata
    }

    /// Current attribute values, in declaration order.
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Get the current value of one attribute.
    pub fn get_attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Set an attribute after checking it against the declaration.
    ///
    /// On error the previous value is kept.
    pub fn set_attribute(&mut self, name: &str, value: Value) -> AttributeResult<()> {
        let definition = self
            .metadata
            .get_attribute(name)
            .ok_or_else(|| AttributeError::Unknown {
                filter: self.metadata.id.clone(),
                attribute: name.to_string(),
            })?;
        definition.validate(&value)?;

        let mut candidate = self.attributes.clone();
        candidate.insert(name.to_string(), value);
        self.filter.validate(&candidate)?;

        log::debug!("{} ({}): {} = {}", self.metadata.id, self.id, name, candidate[name]);
        self.attributes = candidate;
        Ok(())
    }

    /// Restore every attribute to its default.
    pub fn reset_attributes(&mut self) {
        self.attributes = self.metadata.default_attributes();
    }

    /// Check all current attribute values.
    pub fn validate(&self) -> AttributeResult<()> {
        for definition in &self.metadata.attributes {
            let value = self
                .attributes
                .get(&definition.name)
                .unwrap_or(&definition.default_value);
            definition.validate(value)?;
        }
        self.filter.validate(&self.attributes)
    }

    /// Run the filter on one image with parallel pixel loops.
    pub fn run(&self, image: &Image, heatmap: &Heatmap) -> PipelineResult<Image> {
        self.run_with(image, heatmap, true)
    }

    /// Run the filter on one image.
    ///
    /// Rejects mismatched dimensions and invalid attributes before the filter
    /// sees any pixel, and checks the filter honoured the size contract.
    pub fn run_with(&self, image: &Image, heatmap: &Heatmap, parallel: bool) -> PipelineResult<Image> {
        let expected = Dimensions::of(image);
        if heatmap.dimensions() != expected {
            return Err(PipelineError::DimensionMismatch {
                image: expected,
                heatmap: heatmap.dimensions(),
            });
        }

        self.validate()
            .map_err(|error| PipelineError::InvalidAttribute {
                filter: self.metadata.id.clone(),
                error,
            })?;

        let ctx = FilterContext::new(self.id, &self.metadata.id, image, heatmap, &self.attributes)
            .with_parallel(parallel);
        let output = self.filter.run(&ctx)?;

        let got = Dimensions::of(&output);
        if got != expected {
            return Err(PipelineError::OutputDimensions {
                filter: self.metadata.id.clone(),
                expected,
                got,
            });
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::attribute::AttributeDefinition;
    use crate::core::filter::Category;
    use crate::core::types::AttributeType;
    use image::Rgb;

    /// Adds `offset` to the red channel where the heatmap is zero.
    #[derive(Debug, Clone)]
    struct RedShift;

    impl Filter for RedShift {
        fn metadata(&self) -> FilterMetadata {
            FilterMetadata::builder("red_shift", "Red Shift")
                .category(Category::Custom)
                .attribute(
                    AttributeDefinition::new("offset", AttributeType::Integer, Value::Integer(10))
                        .with_range(0.0, 100.0),
                )
                .attribute(AttributeDefinition::new(
                    "limit",
                    AttributeType::Integer,
                    Value::Integer(100),
                ))
                .build()
        }

        fn validate(&self, attributes: &Attributes) -> AttributeResult<()> {
            let offset = attributes.get("offset").and_then(Value::as_integer).unwrap_or(0);
            let limit = attributes.get("limit").and_then(Value::as_integer).unwrap_or(0);
            if offset > limit {
                return Err(AttributeError::OutOfDomain {
                    attribute: "offset".to_string(),
                    error: "offset exceeds limit".to_string(),
                });
            }
            Ok(())
        }

        fn run(&self, ctx: &FilterContext<'_>) -> PipelineResult<Image> {
            let offset = ctx.get_integer("offset")? as f32;
            Ok(ctx.map_weighted(|_, px, w| {
                [crate::core::blend::lerp(px[0], px[0] as f32 + offset, w), px[1], px[2]]
            }))
        }

        fn clone_box(&self) -> Box<dyn Filter> {
            Box::new(self.clone())
        }
    }

    #[derive(Debug, Clone)]
    struct Shrink;

    impl Filter for Shrink {
        fn metadata(&self) -> FilterMetadata {
            FilterMetadata::builder("shrink", "Shrink").build()
        }

        fn run(&self, _ctx: &FilterContext<'_>) -> PipelineResult<Image> {
            Ok(Image::new(1, 1))
        }

        fn clone_box(&self) -> Box<dyn Filter> {
            Box::new(self.clone())
        }
    }

    #[test]
    fn test_new_instance_uses_defaults() {
        let instance = FilterInstance::new(Box::new(RedShift));
        assert_eq!(instance.name(), "red_shift");
        assert_eq!(instance.display_name(), "Red Shift");
        assert_eq!(instance.get_attribute("offset"), Some(&Value::Integer(10)));
        assert_eq!(instance.attributes().len(), 2);
    }

    #[test]
    fn test_set_attribute_rejects_invalid_values() {
        let mut instance = FilterInstance::new(Box::new(RedShift));

        assert!(matches!(
            instance.set_attribute("nope", Value::Integer(1)),
            Err(AttributeError::Unknown { .. })
        ));
        assert!(matches!(
            instance.set_attribute("offset", Value::Integer(-5)),
            Err(AttributeError::OutOfDomain { .. })
        ));
        assert!(matches!(
            instance.set_attribute("offset", Value::Float(2.0)),
            Err(AttributeError::TypeMismatch { .. })
        ));
        assert_eq!(instance.get_attribute("offset"), Some(&Value::Integer(10)));

        instance.set_attribute("offset", Value::Integer(20)).unwrap();
        assert_eq!(instance.get_attribute("offset"), Some(&Value::Integer(20)));

        instance.reset_attributes();
        assert_eq!(instance.get_attribute("offset"), Some(&Value::Integer(10)));
    }

    #[test]
    fn test_cross_attribute_validation() {
        let mut instance = FilterInstance::new(Box::new(RedShift));
        instance.set_attribute("limit", Value::Integer(50)).unwrap();
        assert!(instance.set_attribute("offset", Value::Integer(60)).is_err());
        assert!(instance.set_attribute("offset", Value::Integer(50)).is_ok());
    }

    #[test]
    fn test_run_rejects_dimension_mismatch() {
        let instance = FilterInstance::new(Box::new(RedShift));
        let image = Image::new(4, 4);
        let heatmap = Heatmap::filled(4, 3, 0.0);

        assert!(matches!(
            instance.run(&image, &heatmap),
            Err(PipelineError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_run_applies_weighted_effect() {
        let instance = FilterInstance::new(Box::new(RedShift));
        let image = Image::from_pixel(2, 1, Rgb([100, 50, 50]));
        let heatmap = Heatmap::new(2, 1, vec![0.0, 1.0]).unwrap();

        let out = instance.run(&image, &heatmap).unwrap();
        assert_eq!(out.get_pixel(0, 0), &Rgb([110, 50, 50]));
        assert_eq!(out.get_pixel(1, 0), &Rgb([100, 50, 50]));
        // Inputs untouched
        assert_eq!(image.get_pixel(0, 0), &Rgb([100, 50, 50]));
    }

    #[test]
    fn test_run_checks_output_dimensions() {
        let instance = FilterInstance::new(Box::new(Shrink));
        let image = Image::new(3, 3);
        let heatmap = Heatmap::filled(3, 3, 1.0);

        assert!(matches!(
            instance.run(&image, &heatmap),
            Err(PipelineError::OutputDimensions { .. })
        ));
    }

    #[test]
    fn test_clone_keeps_id_and_attributes() {
        let instance = FilterInstance::new(Box::new(RedShift))
            .with_attribute("offset", Value::Integer(3))
            .unwrap();
        let copy = instance.clone();
        assert_eq!(copy.id, instance.id);
        assert_eq!(copy.attributes(), instance.attributes());
    }
}
