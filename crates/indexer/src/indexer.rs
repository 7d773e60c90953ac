//! Concurrent bulk indexer
//!
//! `Indexer` buffers events in their JSON encoding until either the
//! accumulated buffer reaches `flush_bytes` or `flush_interval` elapses,
//! then hands the buffer to a flush task that issues one bulk request.
//!
//! A single buffer is filled at a time so bulk requests stay densely packed;
//! up to `max_requests` buffers may be flushing concurrently, letting
//! encoding make progress while the store services earlier requests. The
//! idle-buffer pool is a bounded channel and doubles as the admission
//! semaphore: taking a buffer is the only point where callers block.

use std::sync::Arc;

use async_trait::async_trait;
use funnel_model::{Batch, Event};
use tokio::sync::{Mutex, RwLock, mpsc};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::buffer::BulkBuffer;
use crate::client::BulkClient;
use crate::config::IndexerConfig;
use crate::encoder::EncoderPool;
use crate::error::IndexError;
use crate::metrics::{IndexerMetrics, Stats};
use crate::processor::BatchProcessor;
use crate::rate_limited_logger::RateLimitedLogger;

/// Bulk indexes events into the document store.
///
/// Cheap to clone; all clones share one indexer. Safe to call from many
/// concurrent tasks.
#[derive(Clone)]
pub struct Indexer {
    inner: Arc<Inner>,
}

struct Inner {
    config: IndexerConfig,
    client: Arc<dyn BulkClient>,
    metrics: IndexerMetrics,
    encoders: EncoderPool,

    /// Closing flag. `process_batch` holds the lock shared for the whole
    /// call; `close` holds it exclusively, so once `close` has the lock no
    /// submission is in progress.
    lifecycle: RwLock<bool>,

    /// Cancelled when a cancelled `close` aborts in-flight bulk requests.
    closed: CancellationToken,

    /// Active-buffer slot, idle-pool receiver and flush timer state. Held
    /// across the whole append path, never across a bulk request.
    fill: Mutex<FillState>,

    /// Returns recycled buffers to the idle pool.
    pool_tx: mpsc::Sender<BulkBuffer>,

    /// In-flight flush tasks, drained by `close`.
    flushes: parking_lot::Mutex<JoinSet<Result<(), IndexError>>>,

    request_log: RateLimitedLogger,
    item_log: RateLimitedLogger,
}

struct FillState {
    /// Receiving side of the idle pool.
    pool: mpsc::Receiver<BulkBuffer>,

    /// The buffer currently being filled, if any.
    active: Option<BulkBuffer>,

    /// Bumped whenever the flush timer is armed or disarmed. A timer task
    /// only fires if its generation is still current, which resolves the
    /// race between a deadline flush and a size-threshold flush: both run
    /// under the fill lock, so exactly one performs the handoff.
    timer_generation: u64,
}

impl Indexer {
    /// Create an indexer writing through `client`. Unset config options are
    /// replaced with their defaults; all `max_requests` buffers are
    /// allocated up front.
    pub fn new(client: Arc<dyn BulkClient>, config: IndexerConfig) -> Self {
        let config = config.normalized();
        let (pool_tx, pool_rx) = mpsc::channel(config.max_requests);
        for _ in 0..config.max_requests {
            // The channel was created with exactly this capacity.
            let _ = pool_tx.try_send(BulkBuffer::new());
        }

        Self {
            inner: Arc::new(Inner {
                config,
                client,
                metrics: IndexerMetrics::new(),
                encoders: EncoderPool::default(),
                lifecycle: RwLock::new(false),
                closed: CancellationToken::new(),
                fill: Mutex::new(FillState {
                    pool: pool_rx,
                    active: None,
                    timer_generation: 0,
                }),
                pool_tx,
                flushes: parking_lot::Mutex::new(JoinSet::new()),
                request_log: RateLimitedLogger::default(),
                item_log: RateLimitedLogger::default(),
            }),
        }
    }

    /// Serialize each event in `batch` and enqueue it for bulk indexing,
    /// stopping at the first error.
    ///
    /// Returns [`IndexError::Closed`] once `close` has begun. Blocks while
    /// all buffers are in flight; `cancel` aborts that wait with
    /// [`IndexError::Cancelled`]. An event already appended stays appended.
    pub async fn process_batch(
        &self,
        cancel: &CancellationToken,
        batch: &Batch,
    ) -> Result<(), IndexError> {
        let lifecycle = self.inner.lifecycle.read().await;
        if *lifecycle {
            return Err(IndexError::Closed);
        }
        for event in batch {
            self.process_event(cancel, event).await?;
        }
        Ok(())
    }

    /// Close the indexer, flushing any buffered events first.
    ///
    /// Waits for all in-flight flushes and returns the first flush error
    /// observed over the indexer's lifetime. If `cancel` fires during the
    /// wait, in-flight bulk requests are aborted and `close` returns
    /// [`IndexError::Cancelled`].
    pub async fn close(&self, cancel: &CancellationToken) -> Result<(), IndexError> {
        let mut closing = self.inner.lifecycle.write().await;
        if !*closing {
            *closing = true;
            let mut fill = self.inner.fill.lock().await;
            self.hand_off(&mut fill);
        }

        let mut flushes = std::mem::take(&mut *self.inner.flushes.lock());
        let mut first_error = None;
        let mut cancelled = cancel.is_cancelled();
        if cancelled {
            self.inner.closed.cancel();
        }

        loop {
            tokio::select! {
                joined = flushes.join_next() => match joined {
                    None => break,
                    Some(Ok(Ok(()))) => {}
                    Some(Ok(Err(err))) => {
                        if first_error.is_none() {
                            first_error = Some(err);
                        }
                    }
                    Some(Err(join_error)) => {
                        tracing::error!(error = %join_error, "flush task failed");
                    }
                },
                _ = cancel.cancelled(), if !cancelled => {
                    cancelled = true;
                    self.inner.closed.cancel();
                }
            }
        }

        if cancelled {
            return Err(IndexError::Cancelled);
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Snapshot of the indexing counters.
    pub fn stats(&self) -> Stats {
        self.inner.metrics.snapshot()
    }

    async fn process_event(
        &self,
        cancel: &CancellationToken,
        event: &Event,
    ) -> Result<(), IndexError> {
        let mut encoder = self.inner.encoders.get();
        if let Err(err) = encoder.encode(event) {
            self.inner.encoders.put(encoder);
            return Err(err);
        }

        let mut fill = self.inner.fill.lock().await;
        let mut buffer = match fill.active.take() {
            Some(buffer) => buffer,
            None => {
                let buffer = tokio::select! {
                    buffer = fill.pool.recv() => match buffer {
                        Some(buffer) => buffer,
                        None => {
                            self.inner.encoders.put(encoder);
                            return Err(IndexError::Closed);
                        }
                    },
                    _ = cancel.cancelled() => {
                        self.inner.encoders.put(encoder);
                        return Err(IndexError::Cancelled);
                    }
                };
                self.arm_timer(&mut fill);
                buffer
            }
        };

        if let Err(err) = buffer.add(encoder.index(), encoder.document()) {
            fill.active = Some(buffer);
            self.inner.encoders.put(encoder);
            return Err(err);
        }
        self.inner.metrics.event_added();
        self.inner.encoders.put(encoder);

        if buffer.len() >= self.inner.config.flush_bytes {
            // Disarm the timer; its scheduled fire will see a stale
            // generation and leave the next buffer alone.
            fill.timer_generation = fill.timer_generation.wrapping_add(1);
            self.spawn_flush(buffer);
        } else {
            fill.active = Some(buffer);
        }
        Ok(())
    }

    /// Arm the flush timer for the buffer that just became non-empty.
    fn arm_timer(&self, fill: &mut FillState) {
        fill.timer_generation = fill.timer_generation.wrapping_add(1);
        let generation = fill.timer_generation;
        let indexer = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(indexer.inner.config.flush_interval).await;
            let mut fill = indexer.inner.fill.lock().await;
            if fill.timer_generation == generation {
                indexer.hand_off(&mut fill);
            }
        });
    }

    /// Transfer the active buffer, if any, to a flush task and disarm the
    /// timer.
    fn hand_off(&self, fill: &mut FillState) {
        fill.timer_generation = fill.timer_generation.wrapping_add(1);
        if let Some(buffer) = fill.active.take() {
            self.spawn_flush(buffer);
        }
    }

    fn spawn_flush(&self, buffer: BulkBuffer) {
        let indexer = self.clone();
        self.inner
            .flushes
            .lock()
            .spawn(async move { indexer.flush(buffer).await });
    }

    /// Issue one bulk request for `buffer`, account the per-item outcome and
    /// recycle the buffer into the idle pool.
    async fn flush(&self, buffer: BulkBuffer) -> Result<(), IndexError> {
        let items = buffer.items() as u64;
        if items == 0 {
            self.recycle(buffer);
            return Ok(());
        }

        let result = tokio::select! {
            result = self.inner.client.bulk(buffer.bytes()) => {
                result.map_err(IndexError::Transport)
            }
            _ = self.inner.closed.cancelled() => Err(IndexError::Cancelled),
        };
        self.inner.metrics.items_settled(items);

        let response = match result {
            Ok(response) => response,
            Err(err) => {
                self.inner.metrics.items_failed(items);
                self.inner
                    .request_log
                    .error("bulk indexing request failed", &err);
                self.recycle(buffer);
                return Err(err);
            }
        };

        let mut rejected = 0u64;
        for item in &response.items {
            if item.is_rejected() {
                rejected += 1;
                let (kind, reason) = item
                    .error
                    .as_ref()
                    .map(|e| (e.kind.as_str(), e.reason.as_str()))
                    .unwrap_or_default();
                let detail = format!("status {}, {kind}: {reason}", item.status);
                self.inner.item_log.warn("failed to index event", &detail);
            }
        }
        if rejected > 0 {
            self.inner.metrics.items_failed(rejected);
        }
        self.recycle(buffer);
        Ok(())
    }

    fn recycle(&self, mut buffer: BulkBuffer) {
        buffer.reset();
        // The pool holds every buffer the indexer allocated, so capacity is
        // always available here.
        let _ = self.inner.pool_tx.try_send(buffer);
    }
}

#[async_trait]
impl BatchProcessor for Indexer {
    async fn process_batch(
        &self,
        cancel: &CancellationToken,
        batch: &Batch,
    ) -> Result<(), IndexError> {
        Indexer::process_batch(self, cancel, batch).await
    }
}

#[cfg(test)]
#[path = "indexer_test.rs"]
mod indexer_test;
