//! Heatmap-weighted pixel blending.
//!
//! Every built-in filter ends with one of these helpers: either a per-pixel
//! mapping that receives the heatmap weight, or a blend between the original
//! image and a fully degraded copy. Rows are independent, so they may be
//! processed on the rayon pool without affecting the result.

use crate::core::types::{Heatmap, Image};
use rayon::prelude::*;

/// Linear interpolation between a degraded and an original sample.
///
/// `weight` is the share of the original: 1.0 returns `original`.
#[inline]
pub fn lerp(original: u8, degraded: f32, weight: f32) -> u8 {
    let value = original as f32 * weight + degraded * (1.0 - weight);
    value.round().clamp(0.0, 255.0) as u8
}

/// Map every pixel of `image` through `f(index, rgb, weight)`.
///
/// `index` is the row-major pixel index and `weight` is the heatmap value at
/// that pixel clamped to [0, 1]. The caller guarantees matching dimensions.
pub fn map_weighted<F>(image: &Image, heatmap: &Heatmap, parallel: bool, f: F) -> Image
where
    F: Fn(usize, [u8; 3], f32) -> [u8; 3] + Sync,
{
    let (width, height) = image.dimensions();
    let mut output = Image::new(width, height);
    let row_len = width as usize * 3;
    if row_len == 0 || height == 0 {
        return output;
    }

    let source = image.as_raw();
    let weights = heatmap.as_slice();

    let process_row = |(y, row): (usize, &mut [u8])| {
        let offset = y * row_len;
        let src_row = &source[offset..offset + row_len];
        for (x, (dst, px)) in row
            .chunks_exact_mut(3)
            .zip(src_row.chunks_exact(3))
            .enumerate()
        {
            let index = y * width as usize + x;
            let weight = sanitize(weights[index]);
            let mapped = f(index, [px[0], px[1], px[2]], weight);
            dst.copy_from_slice(&mapped);
        }
    };

    if parallel {
        output
            .par_chunks_mut(row_len)
            .enumerate()
            .for_each(process_row);
    } else {
        output.chunks_mut(row_len).enumerate().for_each(process_row);
    }

    output
}

/// Blend `original` towards `degraded` using the heatmap as the keep weight.
pub fn blend(original: &Image, degraded: &Image, heatmap: &Heatmap, parallel: bool) -> Image {
    let degraded_raw = degraded.as_raw();
    map_weighted(original, heatmap, parallel, |index, px, weight| {
        let d = &degraded_raw[index * 3..index * 3 + 3];
        [
            lerp(px[0], d[0] as f32, weight),
            lerp(px[1], d[1] as f32, weight),
            lerp(px[2], d[2] as f32, weight),
        ]
    })
}

/// Clamp a weight into [0, 1], treating NaN as full degradation.
#[inline]
fn sanitize(weight: f32) -> f32 {
    if weight.is_nan() {
        0.0
    } else {
        weight.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn gradient(width: u32, height: u32) -> Image {
        Image::from_fn(width, height, |x, y| {
            Rgb([(x * 40) as u8, (y * 60) as u8, ((x + y) * 20) as u8])
        })
    }

    #[test]
    fn test_lerp_endpoints() {
        assert_eq!(lerp(200, 10.0, 1.0), 200);
        assert_eq!(lerp(200, 10.0, 0.0), 10);
        assert_eq!(lerp(200, 100.0, 0.5), 150);
    }

    #[test]
    fn test_blend_full_weight_keeps_original() {
        let original = gradient(5, 4);
        let degraded = Image::from_pixel(5, 4, Rgb([0, 0, 0]));
        let heatmap = Heatmap::filled(5, 4, 1.0);

        assert_eq!(blend(&original, &degraded, &heatmap, true), original);
    }

    #[test]
    fn test_blend_zero_weight_takes_degraded() {
        let original = gradient(5, 4);
        let degraded = Image::from_pixel(5, 4, Rgb([9, 8, 7]));
        let heatmap = Heatmap::filled(5, 4, 0.0);

        assert_eq!(blend(&original, &degraded, &heatmap, false), degraded);
    }

    #[test]
    fn test_weights_are_clamped() {
        let original = Image::from_pixel(2, 1, Rgb([100, 100, 100]));
        let degraded = Image::from_pixel(2, 1, Rgb([0, 0, 0]));
        let heatmap = Heatmap::new(2, 1, vec![4.0, f32::NAN]).unwrap();

        let out = blend(&original, &degraded, &heatmap, false);
        assert_eq!(out.get_pixel(0, 0), &Rgb([100, 100, 100]));
        assert_eq!(out.get_pixel(1, 0), &Rgb([0, 0, 0]));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let original = gradient(7, 6);
        let heatmap = Heatmap::from_fn(7, 6, |x, y| (x + y) as f32 / 11.0);
        let invert = |_: usize, px: [u8; 3], w: f32| {
            [lerp(px[0], 255.0 - px[0] as f32, w), px[1], px[2]]
        };

        assert_eq!(
            map_weighted(&original, &heatmap, true, invert),
            map_weighted(&original, &heatmap, false, invert)
        );
    }

    #[test]
    fn test_empty_image() {
        let original = Image::new(0, 0);
        let heatmap = Heatmap::filled(0, 0, 1.0);
        let out = map_weighted(&original, &heatmap, true, |_, px, _| px);
        assert_eq!(out.dimensions(), (0, 0));
    }
}
