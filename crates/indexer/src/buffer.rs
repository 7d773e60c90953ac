//! Pending bulk request payload
//!
//! `BulkBuffer` accumulates serialized documents plus their per-item action
//! metadata into a single request body. Buffers are allocated once at
//! indexer construction and cycle between the idle pool, the active slot and
//! a flush task; `reset` clears contents without releasing capacity so the
//! allocation is reused for the buffer's whole lifetime.

use bytes::{BufMut, BytesMut};
use serde::Serialize;

use crate::error::IndexError;

/// Initial capacity per buffer; buffers grow toward the flush threshold and
/// keep their capacity across resets.
const INITIAL_CAPACITY: usize = 64 * 1024;

#[derive(Serialize)]
struct CreateAction<'a> {
    create: ActionMeta<'a>,
}

#[derive(Serialize)]
struct ActionMeta<'a> {
    #[serde(rename = "_index")]
    index: &'a str,
}

/// One pending bulk request body.
#[derive(Debug)]
pub struct BulkBuffer {
    buf: BytesMut,
    items: usize,
}

impl BulkBuffer {
    pub fn new() -> Self {
        Self {
            buf: BytesMut::with_capacity(INITIAL_CAPACITY),
            items: 0,
        }
    }

    /// Append one `create` item targeting `index`, with `document` as its
    /// body line. Both the metadata line and the body line are charged to
    /// [`len`](Self::len).
    pub fn add(&mut self, index: &str, document: &[u8]) -> Result<(), IndexError> {
        serde_json::to_writer(
            (&mut self.buf).writer(),
            &CreateAction {
                create: ActionMeta { index },
            },
        )?;
        self.buf.put_u8(b'\n');
        self.buf.put_slice(document);
        self.buf.put_u8(b'\n');
        self.items += 1;
        Ok(())
    }

    /// Bytes accumulated so far, action metadata included.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items == 0
    }

    /// Number of items appended since the last reset.
    pub fn items(&self) -> usize {
        self.items
    }

    /// The pending request payload.
    pub fn bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Clear contents without releasing capacity.
    pub fn reset(&mut self) {
        self.buf.clear();
        self.items = 0;
    }
}

impl Default for BulkBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_writes_action_and_body_lines() {
        let mut buffer = BulkBuffer::new();
        buffer.add("logs-firehose-default", br#"{"message":"one"}"#).unwrap();
        buffer.add("logs-firehose-default", br#"{"message":"two"}"#).unwrap();

        let body = std::str::from_utf8(buffer.bytes()).unwrap();
        let lines: Vec<&str> = body.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], r#"{"create":{"_index":"logs-firehose-default"}}"#);
        assert_eq!(lines[1], r#"{"message":"one"}"#);
        assert_eq!(lines[3], r#"{"message":"two"}"#);
        assert!(body.ends_with('\n'));
        assert_eq!(buffer.items(), 2);
    }

    #[test]
    fn test_len_charges_metadata_and_body() {
        let mut buffer = BulkBuffer::new();
        let action_len = r#"{"create":{"_index":"logs-x-y"}}"#.len();
        buffer.add("logs-x-y", b"{}").unwrap();
        assert_eq!(buffer.len(), action_len + 1 + 2 + 1);
    }

    #[test]
    fn test_reset_keeps_capacity() {
        let mut buffer = BulkBuffer::new();
        buffer.add("logs-x-y", &[b'a'; 1024]).unwrap();
        let capacity = buffer.buf.capacity();

        buffer.reset();
        assert!(buffer.is_empty());
        assert_eq!(buffer.len(), 0);
        assert_eq!(buffer.items(), 0);
        assert_eq!(buffer.buf.capacity(), capacity);
    }
}
