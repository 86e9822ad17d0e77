//! Image and heatmap file I/O.
//!
//! Images are always converted to 8-bit RGB on load. Heatmaps are read as
//! 8-bit grayscale and normalized into [0, 1].

use crate::core::error::GazeResult;
use crate::core::types::{Heatmap, Image};
use std::path::Path;

/// Load an image file as 8-bit RGB.
pub fn load_image(path: impl AsRef<Path>) -> GazeResult<Image> {
    let path = path.as_ref();
    let image = image::open(path)?.to_rgb8();
    log::debug!("Loaded image {} ({}x{})", path.display(), image.width(), image.height());
    Ok(image)
}

/// Load a grayscale heatmap and normalize it into [0, 1].
///
/// Color files are converted to luma first.
pub fn load_heatmap(path: impl AsRef<Path>) -> GazeResult<Heatmap> {
    let path = path.as_ref();
    let heatmap = Heatmap::from_gray(&image::open(path)?.to_luma8());
    log::debug!("Loaded heatmap {} ({})", path.display(), heatmap.dimensions());
    Ok(heatmap)
}

/// Save an image; the format follows the file extension.
///
/// Missing parent directories are created.
pub fn save_image(image: &Image, path: impl AsRef<Path>) -> GazeResult<()> {
    let path = path.as_ref();
    create_parent(path)?;
    image.save(path)?;
    log::debug!("Saved image {}", path.display());
    Ok(())
}

/// Save a heatmap as an 8-bit grayscale preview.
pub fn save_heatmap(heatmap: &Heatmap, path: impl AsRef<Path>) -> GazeResult<()> {
    let path = path.as_ref();
    create_parent(path)?;
    heatmap.to_gray().save(path)?;
    log::debug!("Saved heatmap {}", path.display());
    Ok(())
}

fn create_parent(path: &Path) -> GazeResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
