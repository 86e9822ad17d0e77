//! Noise filters: Noise

use crate::core::attribute::{AttributeDefinition, Constraint};
use crate::core::context::FilterContext;
use crate::core::error::PipelineResult;
use crate::core::filter::{Category, Filter, FilterMetadata};
use crate::core::types::{AttributeType, Image, Value};
use crate::filters::registry::FilterRegistry;

/// Register noise filters.
pub fn register(registry: &mut FilterRegistry) {
    registry.register(|| Box::new(Noise));
}

/// Adds uniform per-channel noise to unattended regions.
///
/// The noise field depends only on `seed` and the image size, so a fixed
/// seed reproduces the same output.
#[derive(Debug, Clone)]
pub struct Noise;

impl Filter for Noise {
    fn metadata(&self) -> FilterMetadata {
        FilterMetadata::builder("noise", "Noise")
            .description("Add grain where the viewer did not look")
            .category(Category::Noise)
            .version("1.0.0")
            .attribute(
                AttributeDefinition::new("amount", AttributeType::Float, Value::Float(0.25))
                    .with_description("Noise amplitude as a fraction of full scale")
                    .with_range(0.0, 1.0),
            )
            .attribute(
                AttributeDefinition::new("seed", AttributeType::Integer, Value::Integer(0))
                    .with_description("Random seed")
                    .with_constraint(Constraint::NonNegative)
                    .with_constraint(Constraint::MaxValue(u32::MAX as f64)),
            )
            .tags(["grain", "random"])
            .build()
    }

    fn run(&self, ctx: &FilterContext<'_>) -> PipelineResult<Image> {
        let amplitude = ctx.get_float("amount")? as f32 * 255.0;
        let seed = ctx.get_integer("seed")? as u32;

        let mut rng = Lcg::new(seed);
        let mut grain = ctx.image().clone();
        for sample in grain.iter_mut() {
            let value = *sample as f32 + rng.next_signed() * amplitude;
            *sample = value.round().clamp(0.0, 255.0) as u8;
        }

        Ok(ctx.blend_with(&grain))
    }

    fn clone_box(&self) -> Box<dyn Filter> {
        Box::new(self.clone())
    }
}

/// Linear congruential generator.
struct Lcg(u32);

impl Lcg {
    fn new(seed: u32) -> Self {
        Lcg(seed)
    }

    fn next(&mut self) -> u32 {
        self.0 = self.0.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        (self.0 >> 16) & 0x7fff
    }

    /// Uniform sample in [-1, 1].
    fn next_signed(&mut self) -> f32 {
        self.next() as f32 / 32767.0 * 2.0 - 1.0
    }
}
