//! Funnel - Bulk indexer
//!
//! A concurrent bulk indexer that accepts batches of normalized events and
//! forwards them to a document store exposing a bulk-write API.
//!
//! # Architecture
//!
//! ```text
//! [Handlers] --process_batch--> [Active Buffer] --threshold/timer--> [Flush Task] --> [Store]
//!                                     ^                                    |
//!                                     +------------ idle pool <-----------+
//! ```
//!
//! Events are serialized into the single currently-filling buffer. The buffer
//! is handed off to a flush task when it reaches `flush_bytes` or when
//! `flush_interval` elapses after the first event entered it. Up to
//! `max_requests` bulk requests may be in flight concurrently; the bounded
//! pool of buffers doubles as the admission semaphore, so callers block on
//! taking a buffer when every one is in flight.
//!
//! Delivery is at-most-once: transport failures and per-item rejections are
//! counted and logged (rate-limited), never retried.

mod buffer;
mod client;
mod config;
mod encoder;
mod error;
mod indexer;
mod metrics;
mod processor;
mod rate_limited_logger;

pub use buffer::BulkBuffer;
pub use client::{BulkClient, BulkItemStatus, BulkResponse, ClientError, ItemError};
pub use config::{
    DEFAULT_FLUSH_BYTES, DEFAULT_FLUSH_INTERVAL, DEFAULT_MAX_REQUESTS, IndexerConfig,
};
pub use encoder::{DocEncoder, EncoderPool};
pub use error::IndexError;
pub use indexer::Indexer;
pub use metrics::Stats;
pub use processor::BatchProcessor;
pub use rate_limited_logger::{DEFAULT_LOG_INTERVAL, RateLimitedLogger};
