//! Color filters: Desaturate, Darken

use crate::core::attribute::AttributeDefinition;
use crate::core::blend::lerp;
use crate::core::context::FilterContext;
use crate::core::error::PipelineResult;
use crate::core::filter::{Category, Filter, FilterMetadata};
use crate::core::types::{AttributeType, Image, Value};
use crate::filters::registry::FilterRegistry;

/// Register color filters.
pub fn register(registry: &mut FilterRegistry) {
    registry.register(|| Box::new(Desaturate));
    registry.register(|| Box::new(Darken));
}

/// Scales saturation by the heatmap.
///
/// Works in HSV with `f32` intermediates: a weight of 0 produces a gray
/// pixel (`r == g == b`), a weight of 1 reproduces the input.
#[derive(Debug, Clone)]
pub struct Desaturate;

impl Filter for Desaturate {
    fn metadata(&self) -> FilterMetadata {
        FilterMetadata::builder("desaturate", "Desaturate")
            .description("Remove color where the viewer did not look")
            .category(Category::Color)
            .version("1.0.0")
            .tags(["saturation", "grayscale", "hsv"])
            .build()
    }

    fn run(&self, ctx: &FilterContext<'_>) -> PipelineResult<Image> {
        Ok(ctx.map_weighted(|_, px, weight| {
            let (h, s, v) = rgb_to_hsv(
                px[0] as f32 / 255.0,
                px[1] as f32 / 255.0,
                px[2] as f32 / 255.0,
            );
            let (r, g, b) = hsv_to_rgb(h, s * weight, v);
            [quantize(r), quantize(g), quantize(b)]
        }))
    }

    fn clone_box(&self) -> Box<dyn Filter> {
        Box::new(self.clone())
    }
}

/// Darkens unattended regions.
#[derive(Debug, Clone)]
pub struct Darken;

impl Filter for Darken {
    fn metadata(&self) -> FilterMetadata {
        FilterMetadata::builder("darken", "Darken")
            .description("Reduce brightness where the viewer did not look")
            .category(Category::Color)
            .version("1.0.0")
            .attribute(
                AttributeDefinition::new("amount", AttributeType::Float, Value::Float(0.5))
                    .with_description("Brightness removed at zero attention (0.0 to 1.0)")
                    .with_range(0.0, 1.0),
            )
            .build()
    }

    fn run(&self, ctx: &FilterContext<'_>) -> PipelineResult<Image> {
        let keep = 1.0 - ctx.get_float("amount")? as f32;

        Ok(ctx.map_weighted(|_, px, weight| {
            px.map(|c| lerp(c, c as f32 * keep, weight))
        }))
    }

    fn clone_box(&self) -> Box<dyn Filter> {
        Box::new(self.clone())
    }
}

#[inline]
fn quantize(channel: f32) -> u8 {
    (channel * 255.0).round().clamp(0.0, 255.0) as u8
}

/// RGB (0..1) → HSV with hue in sextants (0..6), S and V in 0..1.
pub(crate) fn rgb_to_hsv(r: f32, g: f32, b: f32) -> (f32, f32, f32) {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let s = if max > 0.0 { delta / max } else { 0.0 };
    if delta <= 0.0 {
        return (0.0, s, max);
    }

    let h = if max == r {
        ((g - b) / delta).rem_euclid(6.0)
    } else if max == g {
        (b - r) / delta + 2.0
    } else {
        (r - g) / delta + 4.0
    };

    (h, s, max)
}

/// Inverse of [`rgb_to_hsv`].
pub(crate) fn hsv_to_rgb(h: f32, s: f32, v: f32) -> (f32, f32, f32) {
    let chroma = v * s;
    let x = chroma * (1.0 - ((h % 2.0) - 1.0).abs());
    let m = v - chroma;

    let (r, g, b) = match h.floor() as i32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };

    (r + m, g + m, b + m)
}
