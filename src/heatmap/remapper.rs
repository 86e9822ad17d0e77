//! Stateful heatmap remapper.
//!
//! Holds the raw heatmap and the current adjustment and keeps the adjusted
//! heatmap up to date. It recomputes only when one of its setters is called.

use crate::core::error::HeatmapError;
use crate::core::types::Heatmap;
use crate::heatmap::curve::{adjust, RemapConfig, RemapStrategy};
use std::sync::Arc;

/// Remap `raw` with a built-in configuration.
///
/// Pure: identical inputs give bit-identical output of the same size.
pub fn remap(raw: &Heatmap, config: &RemapConfig) -> Heatmap {
    remap_with(raw, &config.curve, config.invert)
}

/// Remap `raw` with any strategy.
pub fn remap_with(raw: &Heatmap, strategy: &dyn RemapStrategy, invert: bool) -> Heatmap {
    raw.map(|v| adjust(strategy, invert, v))
}

/// Holds the current heatmap adjustment and the adjusted heatmap.
#[derive(Clone, Default)]
pub struct HeatmapRemapper {
    config: RemapConfig,
    strategy: Option<Arc<dyn RemapStrategy>>,
    input: Option<Heatmap>,
    output: Option<Heatmap>,
}

impl std::fmt::Debug for HeatmapRemapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeatmapRemapper")
            .field("config", &self.config)
            .field("strategy", &self.strategy.as_ref().map(|s| s.name().to_string()))
            .field("input", &self.input.as_ref().map(Heatmap::dimensions))
            .finish()
    }
}

impl HeatmapRemapper {
    /// Create a remapper with the identity curve and no heatmap.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a remapper with a validated configuration.
    pub fn with_config(config: RemapConfig) -> Result<Self, HeatmapError> {
        let mut remapper = Self::new();
        remapper.set_config(config)?;
        Ok(remapper)
    }

    /// Replace the raw heatmap and recompute.
    pub fn set_input_heatmap(&mut self, raw: Heatmap) {
        log::debug!("Remapper input set ({})", raw.dimensions());
        self.input = Some(raw);
        self.recompute();
    }

    /// Replace the configuration and recompute.
    ///
    /// An invalid configuration is rejected and the previous one is kept.
    pub fn set_config(&mut self, config: RemapConfig) -> Result<(), HeatmapError> {
        if let Err(e) = config.validate() {
            log::warn!("Rejected remap configuration: {}", e);
            return Err(e);
        }
        self.config = config;
        self.recompute();
        Ok(())
    }

    /// Use a custom strategy instead of the configured curve.
    ///
    /// The configured `invert` flag still applies.
    pub fn set_strategy(&mut self, strategy: Arc<dyn RemapStrategy>) {
        self.strategy = Some(strategy);
        self.recompute();
    }

    /// Go back to the configured curve.
    pub fn clear_strategy(&mut self) {
        if self.strategy.take().is_some() {
            self.recompute();
        }
    }

    /// The current configuration.
    pub fn config(&self) -> &RemapConfig {
        &self.config
    }

    /// The raw heatmap, if one was set.
    pub fn input_heatmap(&self) -> Option<&Heatmap> {
        self.input.as_ref()
    }

    /// The adjusted heatmap for the current input and configuration.
    pub fn get_remapped_heatmap(&self) -> Option<&Heatmap> {
        self.output.as_ref()
    }

    fn recompute(&mut self) {
        let Some(raw) = &self.input else {
            return;
        };

        let output = match &self.strategy {
            Some(strategy) => remap_with(raw, strategy.as_ref(), self.config.invert),
            None => remap(raw, &self.config),
        };
        log::debug!(
            "Remapped heatmap ({}) with {}{}",
            output.dimensions(),
            self.strategy.as_ref().map_or(self.config.curve.name(), |s| s.name()),
            if self.config.invert { ", inverted" } else { "" }
        );
        self.output = Some(output);
    }
}
