//! Funnel - Sources
//!
//! HTTP sources that receive agent payloads, decode them into normalized
//! event batches and submit them to the bulk indexer through the
//! [`BatchProcessor`](funnel_indexer::BatchProcessor) seam.
//!
//! # Available Sources
//!
//! - **Firehose** - AWS Kinesis Data Firehose HTTP-endpoint delivery; each
//!   delivery request becomes one batch of log events

pub mod firehose;

pub use firehose::{FirehoseConfig, FirehoseError, FirehoseSource};
