//! Batch processor seam
//!
//! Ingestion handlers depend on this trait rather than on the concrete
//! indexer, so the boundary can be exercised with test doubles.

use async_trait::async_trait;
use funnel_model::Batch;
use tokio_util::sync::CancellationToken;

use crate::error::IndexError;

/// Accepts batches of normalized events for indexing.
#[async_trait]
pub trait BatchProcessor: Send + Sync {
    /// Submit one batch. May block waiting for indexing capacity; `cancel`
    /// aborts that wait.
    async fn process_batch(
        &self,
        cancel: &CancellationToken,
        batch: &Batch,
    ) -> Result<(), IndexError>;
}
