//! Built-in filter implementations.
//!
//! This module contains the standard filters that ship with gazeblur.
//! Registration order here is the catalogue order users see.

mod color;
mod blur;
mod pixelate;
mod noise;

use crate::filters::registry::FilterRegistry;

/// Register all built-in filters.
pub fn register_all(registry: &mut FilterRegistry) {
    color::register(registry);
    blur::register(registry);
    pixelate::register(registry);
    noise::register(registry);
}

// Re-export for direct access
pub use color::{Desaturate, Darken};
pub use blur::{GaussianBlur, BoxBlur};
pub use pixelate::Pixelate;
pub use noise::Noise;
