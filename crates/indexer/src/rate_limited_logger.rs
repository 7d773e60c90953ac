//! Rate-limited flush failure logging
//!
//! A failing store turns every flush into a log line; this limits each kind
//! of failure message to one line per interval, carrying a count of the
//! occurrences suppressed in between.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Default minimum interval between logged messages.
pub const DEFAULT_LOG_INTERVAL: Duration = Duration::from_secs(60);

/// Rate-limited logger for one kind of failure message.
///
/// Thread-safe: an atomic suppression counter and a mutex around the last
/// log time.
#[derive(Debug)]
pub struct RateLimitedLogger {
    min_interval: Duration,
    last_log: Mutex<Option<Instant>>,
    suppressed: AtomicU64,
}

impl RateLimitedLogger {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_log: Mutex::new(None),
            suppressed: AtomicU64::new(0),
        }
    }

    /// Log an error, unless one was logged less than the interval ago.
    ///
    /// Returns true if the message was logged, false if it was suppressed.
    pub fn error(&self, message: &str, error: &dyn std::fmt::Display) -> bool {
        match self.acquire() {
            Some(suppressed) => {
                tracing::error!(error = %error, suppressed, "{message}");
                true
            }
            None => false,
        }
    }

    /// Log a warning, unless one was logged less than the interval ago.
    pub fn warn(&self, message: &str, detail: &dyn std::fmt::Display) -> bool {
        match self.acquire() {
            Some(suppressed) => {
                tracing::warn!(detail = %detail, suppressed, "{message}");
                true
            }
            None => false,
        }
    }

    /// Occurrences suppressed since the last logged message.
    pub fn suppressed(&self) -> u64 {
        self.suppressed.load(Ordering::Relaxed)
    }

    /// Claim the right to log, returning the suppressed count to report, or
    /// `None` when still inside the interval.
    fn acquire(&self) -> Option<u64> {
        let mut last_log = self.last_log.lock();
        let now = Instant::now();

        let allowed = match *last_log {
            None => true,
            Some(last) => now.duration_since(last) >= self.min_interval,
        };

        if allowed {
            *last_log = Some(now);
            Some(self.suppressed.swap(0, Ordering::Relaxed))
        } else {
            self.suppressed.fetch_add(1, Ordering::Relaxed);
            None
        }
    }
}

impl Default for RateLimitedLogger {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_INTERVAL)
    }
}
