//! Document store bulk interface
//!
//! The store itself is an external collaborator; the indexer depends only on
//! this trait and on the per-item response shape. Implementations wrap a
//! concrete store client and issue one HTTP bulk call per invocation.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

/// Errors a bulk client reports for a request as a whole.
///
/// Per-item outcomes are carried in [`BulkResponse`], not here.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network-level failure issuing the request.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The store answered the request itself with a non-success status.
    #[error("store returned status {status}")]
    Status { status: u16 },

    /// The response could not be interpreted.
    #[error("store protocol error: {0}")]
    Protocol(String),
}

/// Per-item error object reported by the store.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemError {
    /// Store-side error type, e.g. `version_conflict_engine_exception`.
    #[serde(rename = "type", default)]
    pub kind: String,

    #[serde(default)]
    pub reason: String,
}

/// Outcome of one item in a bulk response.
#[derive(Debug, Clone, Deserialize)]
pub struct BulkItemStatus {
    /// HTTP-like status for this item. `201` is a successful create.
    pub status: u16,

    #[serde(default)]
    pub error: Option<ItemError>,
}

impl BulkItemStatus {
    /// A successfully created item.
    pub fn created() -> Self {
        Self {
            status: 201,
            error: None,
        }
    }

    /// Whether the store rejected this item.
    pub fn is_rejected(&self) -> bool {
        self.status > 201 || self.error.as_ref().is_some_and(|e| !e.kind.is_empty())
    }
}

/// Response to a bulk request, item order matching the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BulkResponse {
    #[serde(default)]
    pub items: Vec<BulkItemStatus>,
}

/// A client for a document store exposing a bulk-write API.
#[async_trait]
pub trait BulkClient: Send + Sync {
    /// Issue one bulk request carrying `body` (alternating action-metadata
    /// and document lines, newline-delimited) and return the per-item
    /// outcome. A transport or protocol failure surfaces as a single error
    /// for the whole request.
    async fn bulk(&self, body: &[u8]) -> Result<BulkResponse, ClientError>;
}
