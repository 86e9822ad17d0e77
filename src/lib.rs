//! # Gazeblur - Attention-guided Image Degradation
//!
//! Gazeblur applies an ordered stack of image filters to a photograph, with
//! every filter's strength modulated per pixel by a grayscale attention
//! heatmap (for example eye-tracking gaze density). Regions the viewer looked
//! at keep their fidelity; the rest are blurred, desaturated or otherwise
//! degraded.
//!
//! ## Features
//!
//! - **Heatmap-modulated filters**: each filter blends between the original
//!   pixel and a fully degraded one using the heatmap as the keep weight
//! - **Remap curves**: reshape raw attention data with identity, linear,
//!   threshold or gamma curves, or any custom [`RemapStrategy`](heatmap::RemapStrategy)
//! - **Ordered stack**: available and active lists with selection, reordering
//!   and catalogue-order restore
//! - **Extensible**: add custom filters through the [`Filter`](core::Filter) trait
//! - **Parallel rows**: pixel loops run on rayon without changing results
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use gazeblur::prelude::*;
//!
//! let mut session = Session::new();
//! session.load_source_image("photo.jpg")?;
//! session.load_heatmap("gaze.png")?;
//! session.set_remap_config(RemapConfig::new(RemapCurve::gain(1.5)))?;
//!
//! // Activate desaturate, then gaussian_blur
//! let stack = session.stack_mut();
//! stack.select_available(0)?;
//! stack.add()?;
//! stack.select_available(1)?;
//! stack.add()?;
//!
//! session.render()?;
//! session.save_output("out.png")?;
//! ```
//!
//! ## Architecture
//!
//! - [`core`]: Image, heatmap and attribute types, the filter trait, errors
//! - [`filters`]: Filter registry and built-in filters
//! - [`heatmap`]: Remap curves and the stateful remapper
//! - [`execution`]: The filter pipeline and progress reporting
//! - [`stack`]: Available/active stack management
//! - [`session`]: One editing session tying everything together
//! - [`io`], [`config`]: File loading/saving and TOML settings
//!
//! ## Creating Custom Filters
//!
//! ```rust,ignore
//! use gazeblur::prelude::*;
//!
//! #[derive(Debug, Clone)]
//! struct Invert;
//!
//! impl Filter for Invert {
//!     fn metadata(&self) -> FilterMetadata {
//!         FilterMetadata::builder("invert", "Invert")
//!             .category(Category::Color)
//!             .build()
//!     }
//!
//!     fn run(&self, ctx: &FilterContext<'_>) -> PipelineResult<Image> {
//!         Ok(ctx.map_weighted(|_, px, weight| {
//!             px.map(|c| lerp(c, 255.0 - c as f32, weight))
//!         }))
//!     }
//!
//!     fn clone_box(&self) -> Box<dyn Filter> {
//!         Box::new(self.clone())
//!     }
//! }
//!
//! let registry = RegistryBuilder::new().register(|| Box::new(Invert)).build();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod core;
pub mod execution;
pub mod filters;
pub mod heatmap;
pub mod io;
pub mod session;
pub mod stack;

/// Prelude module for convenient imports.
///
/// Import everything commonly needed with:
/// ```rust,ignore
/// use gazeblur::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use crate::core::types::{Attributes, AttributeType, Dimensions, Heatmap, Image, Value, NORMALIZED};

    // Filter trait and types
    pub use crate::core::filter::{Category, Filter, FilterMetadata};
    pub use crate::core::instance::FilterInstance;
    pub use crate::core::context::FilterContext;
    pub use crate::core::blend::lerp;

    // Attribute definitions
    pub use crate::core::attribute::{AttributeDefinition, Constraint};

    // Errors
    pub use crate::core::error::{
        AttributeError, ConfigError, FilterId, GazeError, GazeResult, HeatmapError, PipelineError,
        PipelineResult, StackError, StackSide,
    };

    // Heatmap
    pub use crate::heatmap::{remap, HeatmapRemapper, RemapConfig, RemapCurve, RemapStrategy};

    // Execution
    pub use crate::execution::pipeline::{FilterPipeline, PipelineOptions, RunStats};
    pub use crate::execution::progress::{ProgressCallback, ProgressUpdate};

    // Filters
    pub use crate::filters::registry::{FilterFactory, FilterRegistry, RegistryBuilder};
    pub use crate::filters::builtin::{BoxBlur, Darken, Desaturate, GaussianBlur, Noise, Pixelate};

    // Stack and session
    pub use crate::config::{PipelineSettings, SessionConfig};
    pub use crate::session::Session;
    pub use crate::stack::FilterStack;
}

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
        assert_eq!(super::NAME, "gazeblur");
    }

    #[test]
    fn test_registry_with_builtins() {
        let registry = FilterRegistry::with_builtins();

        assert!(registry.contains("desaturate"));
        assert!(registry.contains("darken"));
        assert!(registry.contains("gaussian_blur"));
        assert!(registry.contains("box_blur"));
        assert!(registry.contains("pixelate"));
        assert!(registry.contains("noise"));
    }

    #[test]
    fn test_session_end_to_end() {
        let image = Image::from_fn(8, 8, |x, y| image::Rgb([(x * 30) as u8, (y * 30) as u8, 90]));
        let heatmap = Heatmap::from_fn(8, 8, |x, _| if x < 4 { 1.0 } else { 0.0 });

        let mut session = Session::new();
        session.set_source_image(image.clone());
        session.set_raw_heatmap(heatmap);
        let stack = session.stack_mut();
        stack.select_available(0).unwrap();
        stack.add().unwrap();

        let output = session.render().unwrap();
        for y in 0..8 {
            assert_eq!(output.get_pixel(0, y), image.get_pixel(0, y));
            let p = output.get_pixel(7, y);
            assert!(p[0] == p[1] && p[1] == p[2]);
        }
    }
}
