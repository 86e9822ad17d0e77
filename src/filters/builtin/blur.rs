//! Blur filters: GaussianBlur, BoxBlur

use crate::core::attribute::AttributeDefinition;
use crate::core::context::FilterContext;
use crate::core::error::PipelineResult;
use crate::core::filter::{Category, Filter, FilterMetadata};
use crate::core::types::{AttributeType, Image, Value};
use crate::filters::registry::FilterRegistry;

/// Register blur filters.
pub fn register(registry: &mut FilterRegistry) {
    registry.register(|| Box::new(GaussianBlur));
    registry.register(|| Box::new(BoxBlur));
}

/// Smallest accepted sigma. Below it the f32 kernel degenerates.
const MIN_SIGMA: f64 = 0.01;

/// Gaussian blur, strongest where attention is lowest.
#[derive(Debug, Clone)]
pub struct GaussianBlur;

impl Filter for GaussianBlur {
    fn metadata(&self) -> FilterMetadata {
        FilterMetadata::builder("gaussian_blur", "Gaussian Blur")
            .description("Blur unattended regions with a Gaussian kernel")
            .category(Category::Blur)
            .version("1.0.0")
            .attribute(
                AttributeDefinition::new("sigma", AttributeType::Float, Value::Float(3.0))
                    .with_description("Standard deviation of the kernel in pixels")
                    .with_range(MIN_SIGMA, 100.0),
            )
            .tags(["gaussian", "smooth"])
            .build()
    }

    fn run(&self, ctx: &FilterContext<'_>) -> PipelineResult<Image> {
        let sigma = ctx.get_float("sigma")? as f32;
        let image = ctx.image();
        if image.width() == 0 || image.height() == 0 {
            return Ok(image.clone());
        }

        let blurred = imageproc::filter::gaussian_blur_f32(image, sigma);
        Ok(ctx.blend_with(&blurred))
    }

    fn clone_box(&self) -> Box<dyn Filter> {
        Box::new(self.clone())
    }
}

/// Box blur (separable mean filter).
#[derive(Debug, Clone)]
pub struct BoxBlur;

impl Filter for BoxBlur {
    fn metadata(&self) -> FilterMetadata {
        FilterMetadata::builder("box_blur", "Box Blur")
            .description("Blur unattended regions with a square mean kernel")
            .category(Category::Blur)
            .version("1.0.0")
            .attribute(
                AttributeDefinition::new("radius", AttributeType::Integer, Value::Integer(3))
                    .with_description("Kernel radius in pixels")
                    .with_range(1.0, 50.0),
            )
            .tags(["mean", "average"])
            .build()
    }

    fn run(&self, ctx: &FilterContext<'_>) -> PipelineResult<Image> {
        let radius = ctx.get_integer("radius")? as usize;
        let image = ctx.image();
        if image.width() == 0 || image.height() == 0 {
            return Ok(image.clone());
        }

        let size = 2 * radius + 1;
        let kernel = vec![1.0 / size as f32; size];
        let blurred = imageproc::filter::separable_filter(image, &kernel, &kernel);

        Ok(ctx.blend_with(&blurred))
    }

    fn clone_box(&self) -> Box<dyn Filter> {
        Box::new(self.clone())
    }
}
