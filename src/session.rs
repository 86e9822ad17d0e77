//! Editing session.
//!
//! A [`Session`] owns everything one user works with: the source image, the
//! raw heatmap and its remapper, the filter stack and the pipeline holding
//! the last render. Nothing is re-rendered implicitly; callers change state
//! and then call [`Session::render`].

use crate::config::SessionConfig;
use crate::core::error::{GazeResult, HeatmapError, PipelineError, PipelineResult};
use crate::core::types::{Heatmap, Image};
use crate::execution::pipeline::{FilterPipeline, PipelineOptions, RunStats};
use crate::filters::registry::FilterRegistry;
use crate::heatmap::curve::{RemapConfig, RemapStrategy};
use crate::heatmap::remapper::HeatmapRemapper;
use crate::io;
use crate::stack::FilterStack;
use std::path::Path;
use std::sync::Arc;

/// One editing session.
pub struct Session {
    registry: FilterRegistry,
    source: Option<Image>,
    remapper: HeatmapRemapper,
    stack: FilterStack,
    pipeline: FilterPipeline,
}

impl Session {
    /// A session over the built-in filters.
    pub fn new() -> Self {
        Self::with_registry(FilterRegistry::with_builtins())
    }

    /// A session whose stack starts with one instance of every registered filter.
    pub fn with_registry(registry: FilterRegistry) -> Self {
        let stack = FilterStack::from_registry(&registry);
        Self {
            registry,
            source: None,
            remapper: HeatmapRemapper::new(),
            stack,
            pipeline: FilterPipeline::new(),
        }
    }

    /// Apply remap and pipeline settings.
    pub fn apply_config(&mut self, config: &SessionConfig) -> Result<(), HeatmapError> {
        self.remapper.set_config(config.remap)?;
        self.pipeline.set_options(config.pipeline.options());
        Ok(())
    }

    /// The filter catalogue.
    pub fn registry(&self) -> &FilterRegistry {
        &self.registry
    }

    // ========================================================================
    // Inputs
    // ========================================================================

    /// Replace the source image.
    pub fn set_source_image(&mut self, image: Image) {
        log::debug!("Source image set ({}x{})", image.width(), image.height());
        self.source = Some(image);
    }

    /// Load the source image from disk.
    pub fn load_source_image(&mut self, path: impl AsRef<Path>) -> GazeResult<()> {
        self.set_source_image(io::load_image(path)?);
        Ok(())
    }

    /// The source image.
    pub fn source_image(&self) -> Option<&Image> {
        self.source.as_ref()
    }

    /// Replace the raw heatmap; the remapped heatmap follows.
    pub fn set_raw_heatmap(&mut self, heatmap: Heatmap) {
        self.remapper.set_input_heatmap(heatmap);
    }

    /// Load and normalize the raw heatmap from disk.
    pub fn load_heatmap(&mut self, path: impl AsRef<Path>) -> GazeResult<()> {
        self.set_raw_heatmap(io::load_heatmap(path)?);
        Ok(())
    }

    /// The raw heatmap.
    pub fn raw_heatmap(&self) -> Option<&Heatmap> {
        self.remapper.input_heatmap()
    }

    /// Change the heatmap adjustment.
    pub fn set_remap_config(&mut self, config: RemapConfig) -> Result<(), HeatmapError> {
        self.remapper.set_config(config)
    }

    /// Use a custom remap strategy.
    pub fn set_remap_strategy(&mut self, strategy: Arc<dyn RemapStrategy>) {
        self.remapper.set_strategy(strategy);
    }

    /// The current heatmap adjustment.
    pub fn remap_config(&self) -> &RemapConfig {
        self.remapper.config()
    }

    /// The adjusted heatmap the next render will use.
    pub fn remapped_heatmap(&self) -> Option<&Heatmap> {
        self.remapper.get_remapped_heatmap()
    }

    /// Replace the pipeline options.
    pub fn set_pipeline_options(&mut self, options: PipelineOptions) {
        self.pipeline.set_options(options);
    }

    // ========================================================================
    // Stack
    // ========================================================================

    /// The filter stack.
    pub fn stack(&self) -> &FilterStack {
        &self.stack
    }

    /// Mutable access to the filter stack.
    pub fn stack_mut(&mut self) -> &mut FilterStack {
        &mut self.stack
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    /// Run the active stack over the source image with the adjusted heatmap.
    ///
    /// The active list is snapshotted at the start of the run. On failure
    /// no output is available afterwards.
    pub fn render(&mut self) -> PipelineResult<&Image> {
        let Some(source) = self.source.as_ref() else {
            self.pipeline.clear();
            return Err(PipelineError::NoSourceImage);
        };
        let Some(heatmap) = self.remapper.get_remapped_heatmap() else {
            self.pipeline.clear();
            return Err(PipelineError::NoHeatmap);
        };

        let snapshot = self.stack.snapshot();
        self.pipeline.run(source, heatmap, &snapshot)
    }

    /// Output of the last successful render.
    pub fn output_image(&self) -> Option<&Image> {
        self.pipeline.get_output_image()
    }

    /// Statistics of the last successful render.
    pub fn render_stats(&self) -> Option<&RunStats> {
        self.pipeline.stats()
    }

    /// Save the last render.
    pub fn save_output(&self, path: impl AsRef<Path>) -> GazeResult<()> {
        let output = self.output_image().ok_or(PipelineError::NoOutput)?;
        io::save_image(output, path)
    }

    /// Save the adjusted heatmap as a grayscale preview.
    pub fn save_remapped_heatmap(&self, path: impl AsRef<Path>) -> GazeResult<()> {
        let heatmap = self.remapped_heatmap().ok_or(PipelineError::NoHeatmap)?;
        io::save_heatmap(heatmap, path)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::GazeError;
    use crate::heatmap::curve::RemapCurve;
    use image::Rgb;

    fn colorful() -> Image {
        Image::from_fn(4, 4, |x, y| Rgb([(x * 60) as u8, (y * 60) as u8, 200]))
    }

    #[test]
    fn test_render_requires_inputs() {
        let mut session = Session::new();
        assert!(matches!(session.render(), Err(PipelineError::NoSourceImage)));

        session.set_source_image(colorful());
        assert!(matches!(session.render(), Err(PipelineError::NoHeatmap)));
        assert!(session.output_image().is_none());
    }

    #[test]
    fn test_render_with_empty_stack() {
        let mut session = Session::new();
        session.set_source_image(colorful());
        session.set_raw_heatmap(Heatmap::filled(4, 4, 0.0));

        assert_eq!(session.render().unwrap(), &colorful());
    }

    #[test]
    fn test_render_uses_remapped_heatmap() {
        let mut session = Session::new();
        session.set_source_image(colorful());
        session.set_raw_heatmap(Heatmap::filled(4, 4, 0.0));
        session.stack_mut().select_available(0).unwrap();
        session.stack_mut().add().unwrap();

        // Raw zeros fully desaturate
        let gray = session.render().unwrap().clone();
        assert!(gray.pixels().all(|p| p[0] == p[1] && p[1] == p[2]));

        // Inverted, they become full attention
        session
            .set_remap_config(RemapConfig::new(RemapCurve::Identity).with_invert(true))
            .unwrap();
        assert_eq!(session.remapped_heatmap().unwrap().get(0, 0), 1.0);
        let kept = session.render().unwrap();
        assert_eq!(kept, &colorful());
    }

    #[test]
    fn test_mismatched_heatmap_discards_output() {
        let mut session = Session::new();
        session.set_source_image(colorful());
        session.set_raw_heatmap(Heatmap::filled(4, 4, 1.0));
        session.render().unwrap();

        session.set_raw_heatmap(Heatmap::filled(5, 4, 1.0));
        assert!(matches!(
            session.render(),
            Err(PipelineError::DimensionMismatch { .. })
        ));
        assert!(session.output_image().is_none());
    }

    #[test]
    fn test_save_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        let mut session = Session::new();

        assert!(matches!(
            session.save_output(&path),
            Err(GazeError::Pipeline(PipelineError::NoOutput))
        ));

        session.set_source_image(colorful());
        session.set_raw_heatmap(Heatmap::filled(4, 4, 0.5));
        session.render().unwrap();
        session.save_output(&path).unwrap();
        session.save_remapped_heatmap(dir.path().join("heat.png")).unwrap();

        assert_eq!(io::load_image(&path).unwrap(), colorful());
    }

    #[test]
    fn test_apply_config() {
        let mut session = Session::new();
        let config = SessionConfig::from_toml_str("[remap.curve]\nkind = \"gamma\"\ngamma = 2.0").unwrap();
        session.apply_config(&config).unwrap();
        assert_eq!(session.remap_config().curve, RemapCurve::Gamma { gamma: 2.0 });

        let bad = SessionConfig::from_toml_str("[remap.curve]\nkind = \"gamma\"\ngamma = 0.0").unwrap();
        assert!(session.apply_config(&bad).is_err());
        assert_eq!(session.remap_config().curve, RemapCurve::Gamma { gamma: 2.0 });
    }
}
