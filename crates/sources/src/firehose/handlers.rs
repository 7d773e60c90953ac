//! Firehose delivery handler
//!
//! Decodes one delivery envelope into a batch of log events and submits it
//! to the indexer as a single unit.

use std::sync::Arc;
use std::time::Duration;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use funnel_auth::AccessKeyStore;
use funnel_indexer::{BatchProcessor, IndexError};
use funnel_model::{
    Account, Batch, Cloud, CloudOrigin, DataStream, Event, Processor, Service, ServiceOrigin,
};
use tokio_util::sync::CancellationToken;

use super::auth::{SourceArn, extract_access_key, extract_source_arn};
use super::json_types::{FirehoseAck, FirehoseEnvelope, FirehoseErrorBody};
use super::metrics::FirehoseMetrics;

/// Dataset Firehose events are routed to.
const DATASET: &str = "firehose";

/// Shared state for the delivery handler.
pub struct HandlerState {
    pub key_store: Arc<AccessKeyStore>,
    pub processor: Arc<dyn BatchProcessor>,
    pub metrics: Arc<FirehoseMetrics>,
    pub namespace: String,
    pub max_payload_size: usize,
    /// Upper bound on one delivery's wait for indexing capacity.
    pub request_timeout: Duration,
    /// Parent of the per-request tokens; fires when the source shuts down.
    pub shutdown: CancellationToken,
}

/// Handle one Firehose delivery request.
///
/// Authentication is checked before the method, matching the delivery
/// protocol's expectation that an unauthenticated probe of any method gets
/// a 401.
pub async fn handle_delivery(
    State(state): State<Arc<HandlerState>>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    state.metrics.request_received();

    let Some(access_key) = extract_access_key(&headers) else {
        state.metrics.auth_failure();
        return error_response(
            StatusCode::UNAUTHORIZED,
            "access key is required for using the firehose endpoint",
            "",
            0,
        );
    };
    if !state.key_store.validate(access_key) {
        state.metrics.auth_failure();
        return error_response(StatusCode::UNAUTHORIZED, "authentication failed", "", 0);
    }

    if method != Method::POST {
        state.metrics.request_client_error();
        return error_response(
            StatusCode::METHOD_NOT_ALLOWED,
            "only POST requests are supported",
            "",
            0,
        );
    }

    if body.len() > state.max_payload_size {
        state.metrics.request_client_error();
        return error_response(
            StatusCode::PAYLOAD_TOO_LARGE,
            "delivery payload exceeds size limit",
            "",
            0,
        );
    }

    let envelope: FirehoseEnvelope = match serde_json::from_slice(&body) {
        Ok(envelope) => envelope,
        Err(err) => {
            state.metrics.request_client_error();
            state.metrics.decode_error();
            return error_response(
                StatusCode::BAD_REQUEST,
                format!("invalid delivery envelope: {err}"),
                "",
                0,
            );
        }
    };

    let base = base_event(&headers, &state.namespace);
    let batch = match build_batch(&envelope, base) {
        Ok(batch) => batch,
        Err(err) => {
            state.metrics.request_client_error();
            state.metrics.decode_error();
            return error_response(
                StatusCode::BAD_REQUEST,
                format!("invalid record data: {err}"),
                &envelope.request_id,
                envelope.timestamp,
            );
        }
    };

    // Each delivery waits for indexing capacity under its own token: a
    // child of the shutdown token, cancelled once the request timeout
    // elapses.
    let cancel = state.shutdown.child_token();
    let result = tokio::select! {
        result = state.processor.process_batch(&cancel, &batch) => result,
        _ = tokio::time::sleep(state.request_timeout) => {
            cancel.cancel();
            Err(IndexError::Cancelled)
        }
    };

    if let Err(err) = result {
        let (status, message) = match err {
            IndexError::Closed => (StatusCode::SERVICE_UNAVAILABLE, "server is shutting down"),
            IndexError::Cancelled => (StatusCode::SERVICE_UNAVAILABLE, "queue is full"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal server error"),
        };
        if status.is_server_error() {
            state.metrics.request_server_error();
        } else {
            state.metrics.request_client_error();
        }
        tracing::warn!(error = %err, request_id = %envelope.request_id, "delivery rejected");
        return error_response(status, message, &envelope.request_id, envelope.timestamp);
    }

    state.metrics.events_enqueued(batch.len());
    state.metrics.request_success();

    let ack = FirehoseAck {
        request_id: envelope.request_id,
        timestamp: envelope.timestamp,
    };
    (StatusCode::OK, Json(ack)).into_response()
}

/// Derive the base event all records in this delivery share.
fn base_event(headers: &HeaderMap, namespace: &str) -> Event {
    let arn_raw = extract_source_arn(headers);
    let arn = SourceArn::parse(arn_raw);

    Event {
        data_stream: DataStream::new(DataStream::TYPE_LOGS, DATASET, namespace),
        cloud: Some(Cloud {
            origin: Some(CloudOrigin {
                account: non_empty(&arn.account_id).map(|id| Account { id }),
                region: non_empty(&arn.region),
            }),
        }),
        service: Some(Service {
            origin: Some(ServiceOrigin {
                id: non_empty(arn_raw),
                name: non_empty(&arn.resource),
            }),
        }),
        ..Default::default()
    }
}

/// Expand a delivery envelope into one log event per non-empty record line.
///
/// Delivery timestamps carry second precision; the sub-second part is
/// dropped before stamping events.
fn build_batch(
    envelope: &FirehoseEnvelope,
    base: Event,
) -> Result<Batch, base64::DecodeError> {
    let timestamp = (envelope.timestamp / 1000) * 1000;
    let mut batch = Batch::new();
    for record in &envelope.records {
        let decoded = BASE64.decode(&record.data)?;
        for line in decoded.split(|byte| *byte == b'\n') {
            if line.is_empty() {
                continue;
            }
            let mut event = base.clone();
            event.timestamp = timestamp;
            event.processor = Some(Processor::Log);
            event.message = Some(String::from_utf8_lossy(line).into_owned());
            batch.push(event);
        }
    }
    Ok(batch)
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Build a Firehose-format error response.
fn error_response(
    status: StatusCode,
    message: impl Into<String>,
    request_id: &str,
    timestamp: i64,
) -> Response {
    let body = FirehoseErrorBody {
        error_message: message.into(),
        request_id: request_id.to_string(),
        timestamp,
    };
    (status, Json(body)).into_response()
}
