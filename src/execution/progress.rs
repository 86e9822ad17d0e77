//! Progress tracking for pipeline runs.

use crate::core::error::FilterId;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Event emitted while a pipeline runs.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressUpdate {
    /// The run has started.
    Started {
        /// Filters in the snapshot
        total_filters: usize,
    },
    /// A filter has started processing.
    FilterStarted {
        /// Instance about to run
        filter_id: FilterId,
        /// Its filter name
        filter_name: String,
        /// Zero-based position in the stack
        index: usize,
        /// Stack length
        total: usize,
    },
    /// A filter has completed processing.
    FilterCompleted {
        /// Instance that finished
        filter_id: FilterId,
        /// Wall time spent in it
        duration_ms: u64,
        /// Filters finished so far
        index: usize,
        /// Stack length
        total: usize,
    },
    /// The run has completed.
    Completed {
        /// Wall time of the whole run
        total_duration_ms: u64,
        /// Filters that ran
        filters_run: usize,
    },
    /// An error occurred.
    Error {
        /// Failing instance, if the failure belongs to one
        filter_id: Option<FilterId>,
        /// Rendered error
        message: String,
    },
}

/// Receives every [`ProgressUpdate`] of a run.
pub type ProgressCallback = Arc<dyn Fn(ProgressUpdate) + Send + Sync>;

/// Tracks progress through one pipeline run.
pub struct ProgressTracker {
    /// Filters in the snapshot.
    total_filters: usize,
    /// Filters finished so far.
    completed_filters: AtomicU64,
    started_at: Option<Instant>,
    callback: Option<ProgressCallback>,
    /// Per-filter durations, in run order.
    filter_times: parking_lot::Mutex<Vec<(String, Duration)>>,
}

impl ProgressTracker {
    /// A tracker for a run of `total_filters` filters.
    pub fn new(total_filters: usize) -> Self {
        Self {
            total_filters,
            completed_filters: AtomicU64::new(0),
            started_at: None,
            callback: None,
            filter_times: parking_lot::Mutex::new(Vec::new()),
        }
    }

    /// Forward events to `callback`.
    pub fn with_callback(mut self, callback: Option<ProgressCallback>) -> Self {
        self.callback = callback;
        self
    }

    /// Mark the run as started.
    pub fn start(&mut self) {
        self.started_at = Some(Instant::now());
        self.emit(ProgressUpdate::Started {
            total_filters: self.total_filters,
        });
    }

    /// A filter is about to run.
    pub fn filter_started(&self, filter_id: FilterId, filter_name: &str) {
        self.emit(ProgressUpdate::FilterStarted {
            filter_id,
            filter_name: filter_name.to_string(),
            index: self.completed(),
            total: self.total_filters,
        });
    }

    /// A filter finished after `duration`.
    pub fn filter_completed(&self, filter_id: FilterId, filter_name: &str, duration: Duration) {
        let completed = self.completed_filters.fetch_add(1, Ordering::Relaxed) as usize + 1;
        self.filter_times.lock().push((filter_name.to_string(), duration));

        self.emit(ProgressUpdate::FilterCompleted {
            filter_id,
            duration_ms: duration.as_millis() as u64,
            index: completed,
            total: self.total_filters,
        });
    }

    /// The run failed.
    pub fn report_error(&self, filter_id: Option<FilterId>, message: String) {
        self.emit(ProgressUpdate::Error { filter_id, message });
    }

    /// The run finished successfully.
    pub fn complete(&self) {
        self.emit(ProgressUpdate::Completed {
            total_duration_ms: self.elapsed().as_millis() as u64,
            filters_run: self.completed(),
        });
    }

    /// Number of filters completed so far.
    pub fn completed(&self) -> usize {
        self.completed_filters.load(Ordering::Relaxed) as usize
    }

    /// Time since [`start`](Self::start).
    pub fn elapsed(&self) -> Duration {
        self.started_at.map(|t| t.elapsed()).unwrap_or_default()
    }

    /// Share of filters finished, 0 to 100.
    pub fn progress_percent(&self) -> f32 {
        if self.total_filters == 0 {
            return 100.0;
        }
        (self.completed() as f32 / self.total_filters as f32) * 100.0
    }

    /// Durations recorded so far.
    pub fn filter_times(&self) -> Vec<(String, Duration)> {
        self.filter_times.lock().clone()
    }

    fn emit(&self, update: ProgressUpdate) {
        if let Some(callback) = &self.callback {
            callback(update);
        }
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_done() {
        let tracker = ProgressTracker::new(4);
        assert_eq!(tracker.progress_percent(), 0.0);

        tracker.filter_completed(FilterId::new(), "a", Duration::from_millis(3));
        tracker.filter_completed(FilterId::new(), "b", Duration::from_millis(5));
        assert_eq!(tracker.progress_percent(), 50.0);
        assert_eq!(tracker.filter_times().len(), 2);

        assert_eq!(ProgressTracker::new(0).progress_percent(), 100.0);
    }

    #[test]
    fn test_callback_sequence() {
        let events = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = events.clone();
        let filter_id = FilterId::new();

        let mut tracker = ProgressTracker::new(1)
            .with_callback(Some(Arc::new(move |update| sink.lock().push(update))));

        tracker.start();
        tracker.filter_started(filter_id, "desaturate");
        tracker.filter_completed(filter_id, "desaturate", Duration::ZERO);
        tracker.complete();

        let events = events.lock();
        assert_eq!(events.len(), 4);
        assert_eq!(events[0], ProgressUpdate::Started { total_filters: 1 });
        assert!(matches!(events[1], ProgressUpdate::FilterStarted { index: 0, .. }));
        assert!(matches!(events[2], ProgressUpdate::FilterCompleted { index: 1, .. }));
        assert!(matches!(events[3], ProgressUpdate::Completed { filters_run: 1, .. }));
    }
}
