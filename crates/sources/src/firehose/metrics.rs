//! Firehose source metrics

use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic counters for the Firehose endpoint.
#[derive(Debug, Default)]
pub struct FirehoseMetrics {
    /// Total delivery requests received.
    pub requests_total: AtomicU64,

    /// Successful requests (200).
    pub requests_success: AtomicU64,

    /// Client errors (4xx).
    pub requests_client_error: AtomicU64,

    /// Server errors (5xx).
    pub requests_server_error: AtomicU64,

    /// Authentication failures.
    pub auth_failures: AtomicU64,

    /// Envelope or record decode failures.
    pub decode_errors: AtomicU64,

    /// Events submitted to the indexer.
    pub events_enqueued: AtomicU64,
}

impl FirehoseMetrics {
    pub const fn new() -> Self {
        Self {
            requests_total: AtomicU64::new(0),
            requests_success: AtomicU64::new(0),
            requests_client_error: AtomicU64::new(0),
            requests_server_error: AtomicU64::new(0),
            auth_failures: AtomicU64::new(0),
            decode_errors: AtomicU64::new(0),
            events_enqueued: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn request_received(&self) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn request_success(&self) {
        self.requests_success.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn request_client_error(&self) {
        self.requests_client_error.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn request_server_error(&self) {
        self.requests_server_error.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn auth_failure(&self) {
        self.auth_failures.fetch_add(1, Ordering::Relaxed);
        self.request_client_error();
    }

    #[inline]
    pub fn decode_error(&self) {
        self.decode_errors.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn events_enqueued(&self, count: usize) {
        self.events_enqueued.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> FirehoseMetricsSnapshot {
        FirehoseMetricsSnapshot {
            requests_total: self.requests_total.load(Ordering::Relaxed),
            requests_success: self.requests_success.load(Ordering::Relaxed),
            requests_client_error: self.requests_client_error.load(Ordering::Relaxed),
            requests_server_error: self.requests_server_error.load(Ordering::Relaxed),
            auth_failures: self.auth_failures.load(Ordering::Relaxed),
            decode_errors: self.decode_errors.load(Ordering::Relaxed),
            events_enqueued: self.events_enqueued.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time snapshot of Firehose source metrics.
#[derive(Debug, Clone, Copy)]
pub struct FirehoseMetricsSnapshot {
    pub requests_total: u64,
    pub requests_success: u64,
    pub requests_client_error: u64,
    pub requests_server_error: u64,
    pub auth_failures: u64,
    pub decode_errors: u64,
    pub events_enqueued: u64,
}
