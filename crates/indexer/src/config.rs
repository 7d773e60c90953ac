//! Indexer configuration

use std::time::Duration;

/// Default maximum number of concurrent bulk requests.
pub const DEFAULT_MAX_REQUESTS: usize = 10;

/// Default flush threshold in bytes (5 MiB).
pub const DEFAULT_FLUSH_BYTES: usize = 5 * 1024 * 1024;

/// Default flush interval.
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(30);

/// Configuration for the bulk indexer.
#[derive(Debug, Clone)]
pub struct IndexerConfig {
    /// Maximum number of bulk requests to execute concurrently. The
    /// indexer's memory usage is approximately
    /// `max_requests * flush_bytes`.
    pub max_requests: usize,

    /// Flush threshold in bytes, measured against the encoded request
    /// payload including per-item action metadata.
    pub flush_bytes: usize,

    /// Flush deadline, measured from the first event entering an empty
    /// buffer.
    pub flush_interval: Duration,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            max_requests: DEFAULT_MAX_REQUESTS,
            flush_bytes: DEFAULT_FLUSH_BYTES,
            flush_interval: DEFAULT_FLUSH_INTERVAL,
        }
    }
}

impl IndexerConfig {
    /// Set the maximum number of concurrent bulk requests.
    pub fn with_max_requests(mut self, max_requests: usize) -> Self {
        self.max_requests = max_requests;
        self
    }

    /// Set the flush threshold in bytes.
    pub fn with_flush_bytes(mut self, flush_bytes: usize) -> Self {
        self.flush_bytes = flush_bytes;
        self
    }

    /// Set the flush interval.
    pub fn with_flush_interval(mut self, flush_interval: Duration) -> Self {
        self.flush_interval = flush_interval;
        self
    }

    /// Replace unset options with their defaults.
    pub(crate) fn normalized(mut self) -> Self {
        if self.max_requests == 0 {
            self.max_requests = DEFAULT_MAX_REQUESTS;
        }
        if self.flush_bytes == 0 {
            self.flush_bytes = DEFAULT_FLUSH_BYTES;
        }
        if self.flush_interval.is_zero() {
            self.flush_interval = DEFAULT_FLUSH_INTERVAL;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = IndexerConfig::default();
        assert_eq!(config.max_requests, 10);
        assert_eq!(config.flush_bytes, 5 * 1024 * 1024);
        assert_eq!(config.flush_interval, Duration::from_secs(30));
    }

    #[test]
    fn test_normalized_fills_unset_options() {
        let config = IndexerConfig {
            max_requests: 0,
            flush_bytes: 0,
            flush_interval: Duration::ZERO,
        }
        .normalized();

        assert_eq!(config.max_requests, DEFAULT_MAX_REQUESTS);
        assert_eq!(config.flush_bytes, DEFAULT_FLUSH_BYTES);
        assert_eq!(config.flush_interval, DEFAULT_FLUSH_INTERVAL);
    }

    #[test]
    fn test_normalized_keeps_explicit_options() {
        let config = IndexerConfig::default()
            .with_max_requests(2)
            .with_flush_bytes(1024)
            .with_flush_interval(Duration::from_secs(1))
            .normalized();

        assert_eq!(config.max_requests, 2);
        assert_eq!(config.flush_bytes, 1024);
        assert_eq!(config.flush_interval, Duration::from_secs(1));
    }
}
