//! Indexer error types

use thiserror::Error;

use crate::client::ClientError;

/// Errors surfaced by the indexer to its callers.
#[derive(Debug, Error)]
pub enum IndexError {
    /// The indexer is closing or closed; non-retryable.
    #[error("indexer closed")]
    Closed,

    /// A cancellation token fired while waiting for an idle buffer, or
    /// while `close` was draining in-flight flushes.
    #[error("operation cancelled")]
    Cancelled,

    /// The event could not be serialized; non-retryable.
    #[error("failed to encode event: {0}")]
    Encode(#[from] serde_json::Error),

    /// A bulk request failed at the network or store-protocol layer. The
    /// whole batch is accounted as failed; `close` returns the first such
    /// error observed over the indexer's lifetime.
    #[error("bulk request failed: {0}")]
    Transport(#[from] ClientError),
}
