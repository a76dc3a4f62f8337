//! Progress reporting.
//!
//! This module provides [`ProgressCallback`] for monitoring a run and
//! [`ProgressInfo`] for the snapshots delivered to it.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use framezip::{ExtractOptions, ProgressCallback, ProgressInfo, Session};
//!
//! struct PrintProgress;
//!
//! impl ProgressCallback for PrintProgress {
//!     fn on_progress(&self, info: &ProgressInfo) {
//!         println!("[{:?}] {}% complete", info.operation, info.percentage);
//!     }
//! }
//!
//! let mut session = Session::new();
//! session.load_path("input.mp4")?;
//! session.set_options(ExtractOptions::new().with_progress(Arc::new(PrintProgress)));
//! session.extract()?;
//! # Ok::<(), framezip::FramezipError>(())
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

/// The kind of work being reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum OperationType {
    /// Seeking and capturing frames.
    FrameExtraction,
    /// Writing captured frames into the archive.
    ArchiveAssembly,
}

/// A snapshot of run progress.
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    /// What kind of work is being performed.
    pub operation: OperationType,
    /// How many items (frames) have been processed so far.
    pub current: u64,
    /// Total items expected, if known ahead of time.
    pub total: Option<u64>,
    /// Completion percentage, 0 to 100.
    pub percentage: u8,
    /// Wall-clock time elapsed since the operation started.
    pub elapsed: Duration,
    /// Media timestamp of the item just processed.
    pub current_timestamp: Option<Duration>,
}

/// Trait for receiving progress updates.
///
/// Callbacks observe the run and cannot halt it.
pub trait ProgressCallback: Send + Sync {
    /// Called after each batch of processed items.
    fn on_progress(&self, info: &ProgressInfo);
}

/// Discards all progress notifications. The default callback.
pub(crate) struct NoOpProgress;

impl ProgressCallback for NoOpProgress {
    fn on_progress(&self, _info: &ProgressInfo) {}
}

/// Tracks timing and batching, and emits callbacks.
pub(crate) struct ProgressTracker {
    callback: Arc<dyn ProgressCallback>,
    operation: OperationType,
    total: Option<u64>,
    current: u64,
    batch_size: u64,
    start_time: Instant,
    items_since_last_report: u64,
    last_percentage: u8,
}

impl ProgressTracker {
    pub(crate) fn new(
        callback: Arc<dyn ProgressCallback>,
        operation: OperationType,
        total: Option<u64>,
        batch_size: u64,
    ) -> Self {
        Self {
            callback,
            operation,
            total,
            current: 0,
            batch_size: batch_size.max(1),
            start_time: Instant::now(),
            items_since_last_report: 0,
            last_percentage: 0,
        }
    }

    /// Record one completed item with the caller's percentage and fire the
    /// callback if the batch threshold is reached.
    pub(crate) fn advance(&mut self, percentage: u8, timestamp: Option<Duration>) {
        self.current += 1;
        self.items_since_last_report += 1;
        self.last_percentage = percentage.min(100);

        if self.items_since_last_report >= self.batch_size {
            self.report(timestamp);
            self.items_since_last_report = 0;
        }
    }

    /// Record one completed item, deriving the percentage from the total.
    pub(crate) fn advance_counted(&mut self) {
        let percentage = match self.total {
            Some(total) if total > 0 => ((self.current + 1) * 100 / total).min(100) as u8,
            _ => 0,
        };
        self.advance(percentage, None);
    }

    /// Emit a final report if the last items fell short of a full batch.
    pub(crate) fn finish(&mut self) {
        if self.items_since_last_report > 0 {
            self.report(None);
            self.items_since_last_report = 0;
        }
    }

    fn report(&self, timestamp: Option<Duration>) {
        let info = ProgressInfo {
            operation: self.operation,
            current: self.current,
            total: self.total,
            percentage: self.last_percentage,
            elapsed: self.start_time.elapsed(),
            current_timestamp: timestamp,
        };

        self.callback.on_progress(&info);
    }
}
