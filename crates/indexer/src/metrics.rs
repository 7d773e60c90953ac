//! Indexing counters

use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic counters tracking indexer activity.
///
/// At any point, `added == active + settled`, where settled items are the
/// sum of successfully indexed and failed items.
#[derive(Debug, Default)]
pub(crate) struct IndexerMetrics {
    /// Events admitted over the indexer's lifetime.
    pub added: AtomicU64,

    /// Events currently buffered or in an in-flight bulk request.
    pub active: AtomicU64,

    /// Events the store rejected, plus events in bulk requests that failed
    /// to be issued.
    pub failed: AtomicU64,
}

impl IndexerMetrics {
    pub const fn new() -> Self {
        Self {
            added: AtomicU64::new(0),
            active: AtomicU64::new(0),
            failed: AtomicU64::new(0),
        }
    }

    /// Record an event appended to the active buffer.
    #[inline]
    pub fn event_added(&self) {
        self.added.fetch_add(1, Ordering::Relaxed);
        self.active.fetch_add(1, Ordering::Relaxed);
    }

    /// Record `n` items leaving flight, whatever their outcome.
    #[inline]
    pub fn items_settled(&self, n: u64) {
        self.active.fetch_sub(n, Ordering::Relaxed);
    }

    /// Record `n` items as failed.
    #[inline]
    pub fn items_failed(&self, n: u64) {
        self.failed.fetch_add(n, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> Stats {
        Stats {
            added: self.added.load(Ordering::Relaxed),
            active: self.active.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time snapshot of bulk indexing statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    /// Number of events added to the indexer.
    pub added: u64,

    /// Number of events waiting in a buffer or in-flight request.
    pub active: u64,

    /// Number of indexing operations that failed.
    pub failed: u64,
}
