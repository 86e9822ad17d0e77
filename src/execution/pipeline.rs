//! The filter pipeline.
//!
//! Threads an image through an ordered list of filter instances, all driven
//! by the same heatmap, and keeps the result of the last successful run.

use crate::core::error::{PipelineError, PipelineResult};
use crate::core::instance::FilterInstance;
use crate::core::types::{Dimensions, Heatmap, Image};
use crate::execution::progress::{ProgressCallback, ProgressTracker, ProgressUpdate};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Pipeline options.
#[derive(Clone)]
pub struct PipelineOptions {
    /// Whether filters may process rows on the rayon pool.
    pub parallel: bool,
    /// Progress callback.
    pub progress_callback: Option<ProgressCallback>,
}

impl std::fmt::Debug for PipelineOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineOptions")
            .field("parallel", &self.parallel)
            .field("progress_callback", &self.progress_callback.as_ref().map(|_| "<callback>"))
            .finish()
    }
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            progress_callback: None,
        }
    }
}

impl PipelineOptions {
    /// Create a new options builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable/disable row-parallel pixel loops.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set progress callback.
    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_callback = Some(Arc::new(callback));
        self
    }
}

/// Statistics of the last successful run.
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    /// Number of filters applied.
    pub filters_run: usize,
    /// Total wall time.
    pub duration: Duration,
    /// Time spent in each filter, in stack order.
    pub filter_durations: Vec<(String, Duration)>,
}

/// Runs a filter stack over an image.
#[derive(Debug, Default)]
pub struct FilterPipeline {
    options: PipelineOptions,
    output: Option<Image>,
    stats: Option<RunStats>,
}

impl FilterPipeline {
    /// Create a pipeline with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a pipeline with the given options.
    pub fn with_options(options: PipelineOptions) -> Self {
        Self {
            options,
            output: None,
            stats: None,
        }
    }

    /// Current options.
    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Replace the options used by later runs.
    pub fn set_options(&mut self, options: PipelineOptions) {
        self.options = options;
    }

    /// Apply `filters` to `image` in order.
    ///
    /// The heatmap must have the image's dimensions and every filter's
    /// attributes must be valid; both are checked before the first filter
    /// runs. Any failure discards the previous output. An empty stack
    /// produces an exact copy of the input.
    pub fn run(
        &mut self,
        image: &Image,
        heatmap: &Heatmap,
        filters: &[FilterInstance],
    ) -> PipelineResult<&Image> {
        self.output = None;
        self.stats = None;

        let mut tracker =
            ProgressTracker::new(filters.len()).with_callback(self.options.progress_callback.clone());

        if let Err(error) = Self::check(image, heatmap, filters) {
            log::warn!("Pipeline rejected input: {}", error);
            tracker.report_error(error.filter_id(), error.to_string());
            return Err(error);
        }

        let start = Instant::now();
        tracker.start();

        let mut current: Option<Image> = None;
        for instance in filters {
            tracker.filter_started(instance.id, instance.name());
            let filter_start = Instant::now();

            let input = current.as_ref().unwrap_or(image);
            let next = match instance.run_with(input, heatmap, self.options.parallel) {
                Ok(next) => next,
                Err(error) => {
                    log::warn!("Filter '{}' failed: {}", instance.name(), error);
                    tracker.report_error(Some(instance.id), error.to_string());
                    return Err(error);
                }
            };

            let elapsed = filter_start.elapsed();
            log::debug!("Applied '{}' ({}) in {:?}", instance.name(), instance.id, elapsed);
            tracker.filter_completed(instance.id, instance.name(), elapsed);
            current = Some(next);
        }

        tracker.complete();
        let stats = RunStats {
            filters_run: tracker.completed(),
            duration: start.elapsed(),
            filter_durations: tracker.filter_times(),
        };
        log::info!(
            "Rendered {} with {} filter(s) in {:?}",
            Dimensions::of(image),
            stats.filters_run,
            stats.duration
        );
        self.stats = Some(stats);

        let output = current.unwrap_or_else(|| image.clone());
        Ok(&*self.output.insert(output))
    }

    /// Output of the last successful run.
    pub fn get_output_image(&self) -> Option<&Image> {
        self.output.as_ref()
    }

    /// Statistics of the last successful run.
    pub fn stats(&self) -> Option<&RunStats> {
        self.stats.as_ref()
    }

    /// Drop the stored output.
    pub fn clear(&mut self) {
        self.output = None;
        self.stats = None;
    }

    fn check(image: &Image, heatmap: &Heatmap, filters: &[FilterInstance]) -> PipelineResult<()> {
        let dimensions = Dimensions::of(image);
        if heatmap.dimensions() != dimensions {
            return Err(PipelineError::DimensionMismatch {
                image: dimensions,
                heatmap: heatmap.dimensions(),
            });
        }

        for instance in filters {
            instance
                .validate()
                .map_err(|error| PipelineError::InvalidAttribute {
                    filter: instance.name().to_string(),
                    error,
                })?;
        }
        Ok(())
    }
}
