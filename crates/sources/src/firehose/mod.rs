//! Firehose Source - AWS Kinesis Data Firehose HTTP-endpoint delivery
//!
//! Accepts the Firehose HTTP delivery request format and turns every
//! non-empty line of every record into one log event routed to the
//! `logs-firehose-<namespace>` data stream.
//!
//! # Protocol
//!
//! ```text
//! POST /firehose
//! X-Amz-Firehose-Access-Key: <key>
//! X-Amz-Firehose-Source-Arn: arn:aws:firehose:us-east-1:123456789:deliverystream/stream
//!
//! {"requestId":"...","timestamp":1600000000000,"records":[{"data":"<base64>"}]}
//! ```
//!
//! Success responses echo the request id and timestamp as
//! `{"requestId":"...","timestamp":...}`; failures carry an additional
//! `errorMessage`, matching the Firehose delivery response format.
//!
//! # Authentication
//!
//! The access key header is validated against an
//! [`AccessKeyStore`](funnel_auth::AccessKeyStore) before anything else,
//! including the method check.

mod auth;
mod config;
mod handlers;
mod json_types;
mod metrics;

#[cfg(test)]
#[path = "firehose_test.rs"]
mod firehose_test;

use std::sync::Arc;

use axum::Router;
use axum::routing::any;
use funnel_auth::AccessKeyStore;
use funnel_indexer::BatchProcessor;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

pub use auth::SourceArn;
pub use config::FirehoseConfig;
pub use metrics::{FirehoseMetrics, FirehoseMetricsSnapshot};

use handlers::{HandlerState, handle_delivery};

/// Firehose source errors.
#[derive(Debug, Error)]
pub enum FirehoseError {
    #[error("failed to bind to {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP server error: {0}")]
    Http(String),
}

/// HTTP source for Firehose delivery-stream ingestion.
pub struct FirehoseSource {
    config: FirehoseConfig,
    key_store: Arc<AccessKeyStore>,
    processor: Arc<dyn BatchProcessor>,
    metrics: Arc<FirehoseMetrics>,
}

impl FirehoseSource {
    pub fn new(
        config: FirehoseConfig,
        key_store: Arc<AccessKeyStore>,
        processor: Arc<dyn BatchProcessor>,
    ) -> Self {
        Self {
            config,
            key_store,
            processor,
            metrics: Arc::new(FirehoseMetrics::new()),
        }
    }

    /// Get reference to metrics
    pub fn metrics(&self) -> &FirehoseMetrics {
        &self.metrics
    }

    /// Run the source.
    ///
    /// Binds the configured address and serves delivery requests until
    /// `cancel` fires, then shuts down gracefully. The same token aborts
    /// any in-progress wait for indexing capacity.
    pub async fn run(self, cancel: CancellationToken) -> Result<(), FirehoseError> {
        let bind_addr = self.config.bind_address();

        let listener = TcpListener::bind(&bind_addr)
            .await
            .map_err(|e| FirehoseError::Bind {
                address: bind_addr.clone(),
                source: e,
            })?;

        tracing::info!(
            source_id = %self.config.id,
            address = %bind_addr,
            "firehose source listening"
        );

        let state = Arc::new(HandlerState {
            key_store: Arc::clone(&self.key_store),
            processor: Arc::clone(&self.processor),
            metrics: Arc::clone(&self.metrics),
            namespace: self.config.namespace.clone(),
            max_payload_size: self.config.max_payload_size,
            request_timeout: self.config.request_timeout,
            shutdown: cancel.clone(),
        });

        let app = build_router(state, &self.config.path);

        let result = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal(cancel))
            .await
            .map_err(|e| FirehoseError::Http(e.to_string()));

        tracing::info!(source_id = %self.config.id, "firehose source stopped");

        result
    }
}

/// Build the axum router.
///
/// The delivery route accepts any method: the handler rejects non-POST
/// itself so the response carries the Firehose error body rather than a
/// bare 405.
fn build_router(state: Arc<HandlerState>, path: &str) -> Router {
    Router::new()
        .route(path, any(handle_delivery))
        .with_state(state)
}

/// Shutdown signal future
async fn shutdown_signal(cancel: CancellationToken) {
    cancel.cancelled().await;
}
