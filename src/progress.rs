//! Progress reporting.
//!
//! A run can take a while on long videos with accurate seeking. Implement
//! [`ProgressCallback`] to observe how many extraction slots have been
//! processed.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use vidsheet::{ProgressCallback, ProgressInfo, SheetOptions};
//!
//! struct PrintProgress;
//!
//! impl ProgressCallback for PrintProgress {
//!     fn on_progress(&self, info: &ProgressInfo) {
//!         if let Some(pct) = info.percentage {
//!             println!("[{:?}] {pct:.1}% complete", info.operation);
//!         }
//!     }
//! }
//!
//! let summary = vidsheet::sheet::run("input.mp4", &SheetOptions::default(), Arc::new(PrintProgress))?;
//! # Ok::<(), vidsheet::SheetError>(())
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

/// The stage of a run being reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum OperationType {
    /// Seeking, decoding and quality-checking frames.
    FrameAcquisition,
    /// Resizing and labelling thumbnails.
    Composition,
}

/// A snapshot of progress.
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    /// What kind of work is being performed.
    pub operation: OperationType,
    /// How many items have been processed so far.
    pub current: u64,
    /// Total items expected, if known ahead of time.
    pub total: Option<u64>,
    /// Completion percentage (0.0 – 100.0), if `total` is known.
    pub percentage: Option<f32>,
    /// Wall-clock time elapsed since the stage started.
    pub elapsed: Duration,
    /// Estimated time remaining, based on current throughput.
    pub estimated_remaining: Option<Duration>,
    /// Video timestamp of the item just processed.
    pub current_timestamp: Option<Duration>,
}

/// Trait for receiving progress updates.
///
/// Callbacks are infallible; they observe but cannot halt a run.
pub trait ProgressCallback: Send + Sync {
    /// Called after each processed item.
    fn on_progress(&self, info: &ProgressInfo);
}

/// Discards all progress notifications. Used when no callback is given.
pub struct NoOpProgress;

impl ProgressCallback for NoOpProgress {
    fn on_progress(&self, _info: &ProgressInfo) {}
}

/// Tracks timing for one stage and emits callbacks.
pub(crate) struct ProgressTracker {
    callback: Arc<dyn ProgressCallback>,
    operation: OperationType,
    total: Option<u64>,
    current: u64,
    start_time: Instant,
}

impl ProgressTracker {
    pub(crate) fn new(
        callback: Arc<dyn ProgressCallback>,
        operation: OperationType,
        total: Option<u64>,
    ) -> Self {
        Self {
            callback,
            operation,
            total,
            current: 0,
            start_time: Instant::now(),
        }
    }

    /// Record one completed item and report it.
    pub(crate) fn advance(&mut self, timestamp: Option<Duration>) {
        self.current += 1;
        self.report(timestamp);
    }

    fn report(&self, timestamp: Option<Duration>) {
        let elapsed = self.start_time.elapsed();

        let percentage = self
            .total
            .filter(|&total| total > 0)
            .map(|total| (self.current as f32 / total as f32) * 100.0);

        let estimated_remaining = self
            .total
            .filter(|_| self.current > 0)
            .map(|total| {
                let remaining = total.saturating_sub(self.current) as f64;
                elapsed.mul_f64(remaining / self.current as f64)
            });

        self.callback.on_progress(&ProgressInfo {
            operation: self.operation,
            current: self.current,
            total: self.total,
            percentage,
            elapsed,
            estimated_remaining,
            current_timestamp: timestamp,
        });
    }
}
