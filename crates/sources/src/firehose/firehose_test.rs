//! Firehose source tests

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use funnel_auth::AccessKeyStore;
use funnel_indexer::{BatchProcessor, ClientError, IndexError};
use funnel_model::{Batch, Processor};
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use super::auth::{ACCESS_KEY_HEADER, SOURCE_ARN_HEADER};
use super::handlers::HandlerState;
use super::metrics::FirehoseMetrics;
use super::*;

const TEST_KEY: &str = "test-firehose-access-key";

/// How the mock processor answers submissions.
#[derive(Clone, Copy)]
enum MockResult {
    Accept,
    Closed,
    Cancelled,
    Transport,
    /// Never finish, as if every buffer were in flight to a slow store.
    Hang,
}

/// Test double capturing submitted batches.
struct MockProcessor {
    result: MockResult,
    batches: Mutex<Vec<Batch>>,
}

impl MockProcessor {
    fn new(result: MockResult) -> Arc<Self> {
        Arc::new(Self {
            result,
            batches: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl BatchProcessor for MockProcessor {
    async fn process_batch(
        &self,
        _cancel: &CancellationToken,
        batch: &Batch,
    ) -> Result<(), IndexError> {
        self.batches.lock().push(batch.clone());
        match self.result {
            MockResult::Accept => Ok(()),
            MockResult::Closed => Err(IndexError::Closed),
            MockResult::Cancelled => Err(IndexError::Cancelled),
            MockResult::Transport => {
                Err(IndexError::Transport(ClientError::Protocol("boom".into())))
            }
            MockResult::Hang => {
                std::future::pending::<()>().await;
                Ok(())
            }
        }
    }
}

fn test_router(result: MockResult) -> (Router, Arc<MockProcessor>) {
    test_router_with_limit(result, 16 * 1024 * 1024)
}

fn test_router_with_limit(
    result: MockResult,
    max_payload_size: usize,
) -> (Router, Arc<MockProcessor>) {
    let key_store = Arc::new(AccessKeyStore::new());
    key_store.insert(TEST_KEY);

    let processor = MockProcessor::new(result);
    let state = Arc::new(HandlerState {
        key_store,
        processor: processor.clone(),
        metrics: Arc::new(FirehoseMetrics::new()),
        namespace: "default".into(),
        max_payload_size,
        request_timeout: Duration::from_secs(30),
        shutdown: CancellationToken::new(),
    });

    (build_router(state, "/firehose"), processor)
}

fn test_router_with_timeout(
    result: MockResult,
    request_timeout: Duration,
) -> (Router, Arc<MockProcessor>) {
    let key_store = Arc::new(AccessKeyStore::new());
    key_store.insert(TEST_KEY);

    let processor = MockProcessor::new(result);
    let state = Arc::new(HandlerState {
        key_store,
        processor: processor.clone(),
        metrics: Arc::new(FirehoseMetrics::new()),
        namespace: "default".into(),
        max_payload_size: 16 * 1024 * 1024,
        request_timeout,
        shutdown: CancellationToken::new(),
    });

    (build_router(state, "/firehose"), processor)
}

fn delivery_request(key: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/firehose")
        .header("content-type", "application/json");
    if let Some(key) = key {
        builder = builder.header(ACCESS_KEY_HEADER, key);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn response_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

// "bGluZTEKbGluZTI=" is base64 for "line1\nline2".
const ENVELOPE: &str =
    r#"{"requestId":"req-1","timestamp":1600000000000,"records":[{"data":"bGluZTEKbGluZTI="}]}"#;

#[tokio::test]
async fn test_delivery_end_to_end() {
    let (app, processor) = test_router(MockResult::Accept);

    let request = delivery_request(Some(TEST_KEY), ENVELOPE);
    let request = {
        let (mut parts, body) = request.into_parts();
        parts.headers.insert(
            SOURCE_ARN_HEADER,
            "arn:aws:firehose:us-east-1:123456789:deliverystream/vpc-flow-log-stream"
                .parse()
                .unwrap(),
        );
        Request::from_parts(parts, body)
    };

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        "application/json"
    );

    let json = response_json(response).await;
    assert_eq!(json["requestId"], "req-1");
    assert_eq!(json["timestamp"], 1_600_000_000_000_i64);

    let batches = processor.batches.lock();
    assert_eq!(batches.len(), 1);
    let batch = &batches[0];
    assert_eq!(batch.len(), 2);
    assert_eq!(batch[0].message.as_deref(), Some("line1"));
    assert_eq!(batch[1].message.as_deref(), Some("line2"));
    for event in batch {
        assert_eq!(event.timestamp, 1_600_000_000_000);
        assert_eq!(event.processor, Some(Processor::Log));
        assert_eq!(event.data_stream.name(), "logs-firehose-default");
        let origin = event.cloud.as_ref().unwrap().origin.as_ref().unwrap();
        assert_eq!(origin.account.as_ref().unwrap().id, "123456789");
        assert_eq!(origin.region.as_deref(), Some("us-east-1"));
        let service = event.service.as_ref().unwrap().origin.as_ref().unwrap();
        assert_eq!(
            service.name.as_deref(),
            Some("deliverystream/vpc-flow-log-stream")
        );
    }
}

#[tokio::test]
async fn test_missing_access_key_is_unauthorized() {
    let (app, processor) = test_router(MockResult::Accept);

    let response = app.oneshot(delivery_request(None, ENVELOPE)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let json = response_json(response).await;
    assert!(
        json["errorMessage"]
            .as_str()
            .unwrap()
            .contains("access key is required")
    );
    assert!(processor.batches.lock().is_empty());
}

#[tokio::test]
async fn test_invalid_access_key_is_unauthorized() {
    let (app, _processor) = test_router(MockResult::Accept);

    let response = app
        .oneshot(delivery_request(Some("wrong-key"), ENVELOPE))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let json = response_json(response).await;
    assert_eq!(json["errorMessage"], "authentication failed");
}

#[tokio::test]
async fn test_non_post_is_rejected_after_auth() {
    let (app, _processor) = test_router(MockResult::Accept);

    let request = Request::builder()
        .method("GET")
        .uri("/firehose")
        .header(ACCESS_KEY_HEADER, TEST_KEY)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

    let json = response_json(response).await;
    assert_eq!(json["errorMessage"], "only POST requests are supported");
}

#[tokio::test]
async fn test_oversized_payload_is_rejected() {
    let (app, processor) = test_router_with_limit(MockResult::Accept, 64);

    let response = app
        .oneshot(delivery_request(Some(TEST_KEY), ENVELOPE))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

    let json = response_json(response).await;
    assert_eq!(json["errorMessage"], "delivery payload exceeds size limit");
    assert_eq!(json["requestId"], "");
    assert_eq!(json["timestamp"], 0);
    assert!(processor.batches.lock().is_empty());
}

#[tokio::test]
async fn test_invalid_envelope_is_bad_request() {
    let (app, _processor) = test_router(MockResult::Accept);

    let response = app
        .oneshot(delivery_request(Some(TEST_KEY), "not json"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_invalid_record_data_is_bad_request() {
    let (app, _processor) = test_router(MockResult::Accept);

    let body =
        r#"{"requestId":"req-2","timestamp":1600000000000,"records":[{"data":"%%%not-base64"}]}"#;
    let response = app
        .oneshot(delivery_request(Some(TEST_KEY), body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Past envelope decoding, errors echo the envelope identity.
    let json = response_json(response).await;
    assert_eq!(json["requestId"], "req-2");
    assert_eq!(json["timestamp"], 1_600_000_000_000_i64);
}

#[tokio::test]
async fn test_empty_record_lines_are_skipped() {
    let (app, processor) = test_router(MockResult::Accept);

    // base64("a\n\nb\n")
    let data = "YQoKYgo=";
    let body = format!(
        r#"{{"requestId":"req-3","timestamp":1600000000000,"records":[{{"data":"{data}"}}]}}"#
    );
    let response = app
        .oneshot(delivery_request(Some(TEST_KEY), &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let batches = processor.batches.lock();
    assert_eq!(batches[0].len(), 2);
    assert_eq!(batches[0][0].message.as_deref(), Some("a"));
    assert_eq!(batches[0][1].message.as_deref(), Some("b"));
}

#[tokio::test]
async fn test_shutdown_maps_to_service_unavailable() {
    let (app, _processor) = test_router(MockResult::Closed);

    let response = app
        .oneshot(delivery_request(Some(TEST_KEY), ENVELOPE))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let json = response_json(response).await;
    assert_eq!(json["errorMessage"], "server is shutting down");
}

#[tokio::test]
async fn test_backpressure_maps_to_service_unavailable() {
    let (app, _processor) = test_router(MockResult::Cancelled);

    let response = app
        .oneshot(delivery_request(Some(TEST_KEY), ENVELOPE))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let json = response_json(response).await;
    assert_eq!(json["errorMessage"], "queue is full");
}

#[tokio::test]
async fn test_capacity_wait_timeout_maps_to_service_unavailable() {
    let (app, _processor) =
        test_router_with_timeout(MockResult::Hang, Duration::from_millis(50));

    let response = app
        .oneshot(delivery_request(Some(TEST_KEY), ENVELOPE))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let json = response_json(response).await;
    assert_eq!(json["errorMessage"], "queue is full");
    assert_eq!(json["requestId"], "req-1");
}

#[tokio::test]
async fn test_indexing_failure_maps_to_internal_error() {
    let (app, _processor) = test_router(MockResult::Transport);

    let response = app
        .oneshot(delivery_request(Some(TEST_KEY), ENVELOPE))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json = response_json(response).await;
    assert_eq!(json["errorMessage"], "internal server error");
    assert_eq!(json["requestId"], "req-1");
}
