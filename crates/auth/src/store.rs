//! Access key store

use parking_lot::RwLock;
use subtle::ConstantTimeEq;

/// Thread-safe store of accepted ingestion access keys.
///
/// Designed for a small, rarely changing key set: validation walks every
/// stored key with a constant-time comparison, so a rejected candidate costs
/// the same as an accepted one.
#[derive(Debug, Default)]
pub struct AccessKeyStore {
    keys: RwLock<Vec<String>>,
}

impl AccessKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an accepted key. Duplicates are ignored.
    pub fn insert(&self, key: impl Into<String>) {
        let key = key.into();
        let mut keys = self.keys.write();
        if !keys.contains(&key) {
            keys.push(key);
        }
    }

    /// Remove a key, returning whether it was present.
    pub fn remove(&self, key: &str) -> bool {
        let mut keys = self.keys.write();
        let before = keys.len();
        keys.retain(|k| k != key);
        keys.len() != before
    }

    /// Validate a candidate key in constant time per stored key.
    pub fn validate(&self, candidate: &str) -> bool {
        let keys = self.keys.read();
        let mut matched = 0u8;
        for key in keys.iter() {
            if key.len() == candidate.len() {
                matched |= key.as_bytes().ct_eq(candidate.as_bytes()).unwrap_u8();
            }
        }
        matched == 1
    }

    pub fn len(&self) -> usize {
        self.keys.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.read().is_empty()
    }
}
