//! In-Memory Store
//!
//! Concurrent hash-map backed store, the usual innermost layer for tests and
//! single-process deployments. Eviction policy is deliberately absent: size
//! management belongs to the backing store chosen by the caller.

use bytes::Bytes;
use dashmap::DashMap;

use crate::error::{Error, Result};
use crate::traits::KvStore;

/// Unbounded in-memory key-value store.
///
/// Backed by a sharded concurrent map, so a single instance can be shared by
/// several decorator stacks without external locking.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<Bytes, Bytes>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryStore {
    fn contains(&self, key: &[u8]) -> Result<bool> {
        Ok(self.entries.contains_key(key))
    }

    fn get(&self, key: &[u8]) -> Result<Bytes> {
        self.entries
            .get(key)
            .map(|entry| entry.value().clone())
            .ok_or(Error::NotFound)
    }

    fn set(&self, key: &[u8], value: Bytes) -> Result<()> {
        self.entries.insert(Bytes::copy_from_slice(key), value);
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> Result<()> {
        self.entries.remove(key).map(|_| ()).ok_or(Error::NotFound)
    }

    fn len(&self) -> Result<usize> {
        Ok(self.entries.len())
    }

    fn keys(&self) -> Result<Vec<Bytes>> {
        Ok(self.entries.iter().map(|e| e.key().clone()).collect())
    }

    fn clear(&self) -> Result<()> {
        self.entries.clear();
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
