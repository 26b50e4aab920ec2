//! Saturation statistics
//!
//! Observers receive events from the workers and never influence the saturation.
//! [`SaturationStatistics`] aggregates them with atomic counters.

use crate::indexing::ClassId;
use std::ops::AddAssign;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Receives progress events from the saturation workers.
///
/// All methods default to doing nothing.
pub trait SaturationObserver: Send + Sync {
    /// A context has been created for `root`.
    fn context_created(&self, _root: ClassId) {}

    /// A worker has finished its processing loop.
    fn worker_finished(&self, _statistics: &WorkerStatistics) {}

    /// A saturation pass has finished.
    fn saturation_finished(&self, _statistics: &WorkerStatistics, _elapsed: Duration) {}
}

/// Counters local to a worker, merged at the end of a pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStatistics {
    /// Contexts taken from the active queue
    pub contexts_processed: u64,
    /// Conclusions taken from the to-do queues
    pub conclusions_processed: u64,
    /// Conclusions that were new to their context
    pub conclusions_stored: u64,
    /// Conclusions handed to the state writer
    pub conclusions_produced: u64,
    /// Contexts created by the writer of the worker
    pub contexts_created: u64,
}

impl AddAssign for WorkerStatistics {
    fn add_assign(&mut self, other: Self) {
        self.contexts_processed += other.contexts_processed;
        self.conclusions_processed += other.conclusions_processed;
        self.conclusions_stored += other.conclusions_stored;
        self.conclusions_produced += other.conclusions_produced;
        self.contexts_created += other.contexts_created;
    }
}

/// Statistics aggregated over all saturation passes
#[derive(Debug, Default)]
pub struct SaturationStatistics {
    /// Total number of saturation passes
    pub saturations_total: AtomicU64,
    /// Total number of contexts created
    pub contexts_created_total: AtomicU64,
    /// Total number of contexts taken from the active queue
    pub contexts_processed_total: AtomicU64,
    /// Total number of conclusions taken from the to-do queues
    pub conclusions_processed_total: AtomicU64,
    /// Total number of conclusions new to their context
    pub conclusions_stored_total: AtomicU64,
    /// Total number of conclusions handed to the state writers
    pub conclusions_produced_total: AtomicU64,
    /// Sum of saturation durations in milliseconds
    pub saturation_duration_sum_ms: AtomicU64,
}

impl SaturationStatistics {
    /// Creates zeroed counters
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the counters of one worker
    pub fn record_worker(&self, statistics: &WorkerStatistics) {
        self.contexts_processed_total
            .fetch_add(statistics.contexts_processed, Ordering::Relaxed);
        self.conclusions_processed_total
            .fetch_add(statistics.conclusions_processed, Ordering::Relaxed);
        self.conclusions_stored_total
            .fetch_add(statistics.conclusions_stored, Ordering::Relaxed);
        self.conclusions_produced_total
            .fetch_add(statistics.conclusions_produced, Ordering::Relaxed);
    }

    /// Record the end of a saturation pass
    pub fn record_saturation(&self, duration: Duration) {
        self.saturations_total.fetch_add(1, Ordering::Relaxed);
        self.saturation_duration_sum_ms.fetch_add(
            u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
            Ordering::Relaxed,
        );
    }

    /// A copy of the current counters as a single [`WorkerStatistics`]
    pub fn snapshot(&self) -> WorkerStatistics {
        WorkerStatistics {
            contexts_processed: self.contexts_processed_total.load(Ordering::Relaxed),
            conclusions_processed: self.conclusions_processed_total.load(Ordering::Relaxed),
            conclusions_stored: self.conclusions_stored_total.load(Ordering::Relaxed),
            conclusions_produced: self.conclusions_produced_total.load(Ordering::Relaxed),
            contexts_created: self.contexts_created_total.load(Ordering::Relaxed),
        }
    }
}

impl SaturationObserver for SaturationStatistics {
    fn context_created(&self, _root: ClassId) {
        self.contexts_created_total.fetch_add(1, Ordering::Relaxed);
    }

    fn worker_finished(&self, statistics: &WorkerStatistics) {
        self.record_worker(statistics);
    }

    fn saturation_finished(&self, _statistics: &WorkerStatistics, elapsed: Duration) {
        self.record_saturation(elapsed);
    }
}
