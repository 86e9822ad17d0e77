//! Stylize filters: Pixelate

use crate::core::attribute::AttributeDefinition;
use crate::core::context::FilterContext;
use crate::core::error::PipelineResult;
use crate::core::filter::{Category, Filter, FilterMetadata};
use crate::core::types::{AttributeType, Image, Value};
use crate::filters::registry::FilterRegistry;
use image::Rgb;

/// Register stylize filters.
pub fn register(registry: &mut FilterRegistry) {
    registry.register(|| Box::new(Pixelate));
}

/// Replaces unattended regions with square blocks of their mean color.
///
/// Blocks are anchored at the top-left corner; the last block in each row
/// and column may be truncated by the image edge.
#[derive(Debug, Clone)]
pub struct Pixelate;

impl Filter for Pixelate {
    fn metadata(&self) -> FilterMetadata {
        FilterMetadata::builder("pixelate", "Pixelate")
            .description("Replace unattended regions with coarse blocks")
            .category(Category::Stylize)
            .version("1.0.0")
            .attribute(
                AttributeDefinition::new("block_size", AttributeType::Integer, Value::Integer(8))
                    .with_description("Block edge length in pixels")
                    .with_range(1.0, 512.0),
            )
            .tags(["mosaic", "blocks"])
            .build()
    }

    fn run(&self, ctx: &FilterContext<'_>) -> PipelineResult<Image> {
        let block = ctx.get_integer("block_size")? as u32;
        let blocks = mosaic(ctx.image(), block);
        Ok(ctx.blend_with(&blocks))
    }

    fn clone_box(&self) -> Box<dyn Filter> {
        Box::new(self.clone())
    }
}

fn mosaic(image: &Image, block: u32) -> Image {
    let (width, height) = image.dimensions();
    let mut output = Image::new(width, height);
    let step = block.max(1);

    for by in (0..height).step_by(step as usize) {
        let y_end = (by + step).min(height);
        for bx in (0..width).step_by(step as usize) {
            let x_end = (bx + step).min(width);

            let mut sum = [0u64; 3];
            for y in by..y_end {
                for x in bx..x_end {
                    for (total, channel) in sum.iter_mut().zip(image.get_pixel(x, y).0) {
                        *total += channel as u64;
                    }
                }
            }

            let count = ((x_end - bx) * (y_end - by)) as f64;
            let mean = Rgb(sum.map(|s| (s as f64 / count).round() as u8));
            for y in by..y_end {
                for x in bx..x_end {
                    output.put_pixel(x, y, mean);
                }
            }
        }
    }

    output
}
