//! Reusable per-event encoding scratch
//!
//! Serializing an event needs a byte buffer for the document and a string
//! builder for the destination name. Both are pooled so the hot path does
//! not allocate per event. An encoder's contents are copied into the bulk
//! buffer at append time, so the encoder is recycled as soon as the append
//! returns.

use bytes::{BufMut, BytesMut};
use crossbeam::queue::ArrayQueue;
use funnel_model::Event;

use crate::error::IndexError;

/// Number of encoders the pool retains.
pub const DEFAULT_POOL_CAPACITY: usize = 64;

/// Initial document scratch capacity per encoder.
const DOC_CAPACITY: usize = 2048;

/// Per-event scratch: a document buffer and a destination-name builder.
#[derive(Debug)]
pub struct DocEncoder {
    doc: BytesMut,
    name: String,
}

impl DocEncoder {
    fn new() -> Self {
        Self {
            doc: BytesMut::with_capacity(DOC_CAPACITY),
            name: String::new(),
        }
    }

    /// Serialize `event`'s document and render its destination name into
    /// this scratch.
    pub fn encode(&mut self, event: &Event) -> Result<(), IndexError> {
        serde_json::to_writer((&mut self.doc).writer(), event)?;
        event.data_stream.write_name(&mut self.name);
        Ok(())
    }

    /// The serialized document.
    pub fn document(&self) -> &[u8] {
        &self.doc
    }

    /// The rendered destination name.
    pub fn index(&self) -> &str {
        &self.name
    }

    fn clear(&mut self) {
        self.doc.clear();
        self.name.clear();
    }
}

/// Lock-free pool of [`DocEncoder`]s.
///
/// `get` pops a recycled encoder or allocates a fresh one when the pool is
/// empty; `put` clears the encoder and returns it, dropping it if the pool
/// is already full.
#[derive(Debug)]
pub struct EncoderPool {
    queue: ArrayQueue<DocEncoder>,
}

impl EncoderPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            queue: ArrayQueue::new(capacity),
        }
    }

    #[inline]
    pub fn get(&self) -> DocEncoder {
        self.queue.pop().unwrap_or_else(DocEncoder::new)
    }

    #[inline]
    pub fn put(&self, mut encoder: DocEncoder) {
        encoder.clear();
        let _ = self.queue.push(encoder);
    }
}

impl Default for EncoderPool {
    fn default() -> Self {
        Self::new(DEFAULT_POOL_CAPACITY)
    }
}
