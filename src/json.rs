//! JSON Codec
//!
//! Canonical JSON rendering for keys and values: object keys sorted, compact
//! separators, no whitespace. Semantically equal composite keys always
//! produce identical serialized text, which is what makes JSON-keyed
//! memoization and cross-process key sharing deterministic.

use std::marker::PhantomData;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;
use crate::stats::StatsReport;
use crate::traits::KvStore;

/// Renders a value as canonical JSON text.
///
/// The value is first lifted into a [`serde_json::Value`], whose object
/// representation orders keys, then written compactly. Values that JSON
/// cannot represent fail with a serialization error.
pub fn canonical_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let tree = serde_json::to_value(value)?;
    Ok(serde_json::to_string(&tree)?)
}

/// Canonical JSON rendered straight to bytes.
pub fn canonical_json_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Bytes> {
    Ok(Bytes::from(canonical_json(value)?.into_bytes()))
}

/// Typed facade mapping JSON-representable keys and values onto a byte
/// store.
///
/// The inner mapping sees canonical JSON text for both keys and values, so
/// any [`KvStore`] stack (prefixed, encrypted, tiered, ...) can back a typed
/// cache.
///
/// ```
/// use cachestack::{JsonCache, MemoryStore};
///
/// let cache: JsonCache<_, (u32, String), Vec<u32>> = JsonCache::new(MemoryStore::new());
/// let key = (7, "query".to_string());
/// cache.set(&key, &vec![1, 2, 3]).unwrap();
/// assert_eq!(cache.get(&key).unwrap(), vec![1, 2, 3]);
/// ```
pub struct JsonCache<S, K, V> {
    inner: S,
    _marker: PhantomData<fn(K) -> V>,
}

impl<S, K, V> JsonCache<S, K, V>
where
    S: KvStore,
    K: Serialize,
    V: Serialize + DeserializeOwned,
{
    /// Wraps a byte store with a typed JSON surface.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            _marker: PhantomData,
        }
    }

    /// Consumes the facade and returns the wrapped store.
    pub fn into_inner(self) -> S {
        self.inner
    }

    fn encode_key(&self, key: &K) -> Result<Bytes> {
        canonical_json_bytes(key)
    }

    /// Checks whether a key is present.
    pub fn contains(&self, key: &K) -> Result<bool> {
        self.inner.contains(&self.encode_key(key)?)
    }

    /// Gets and decodes the value stored under a key.
    pub fn get(&self, key: &K) -> Result<V> {
        let raw = self.inner.get(&self.encode_key(key)?)?;
        Ok(serde_json::from_slice(&raw)?)
    }

    /// Encodes and stores a value under a key.
    pub fn set(&self, key: &K, value: &V) -> Result<()> {
        self.inner
            .set(&self.encode_key(key)?, canonical_json_bytes(value)?)
    }

    /// Removes a key.
    pub fn delete(&self, key: &K) -> Result<()> {
        self.inner.delete(&self.encode_key(key)?)
    }

    /// Entry count of the underlying store.
    pub fn len(&self) -> Result<usize> {
        self.inner.len()
    }

    /// Whether the underlying store is empty.
    pub fn is_empty(&self) -> Result<bool> {
        self.inner.is_empty()
    }

    /// Clears the underlying store.
    pub fn clear(&self) -> Result<()> {
        self.inner.clear()
    }

    /// Stats snapshot of the underlying stack, if any layer tracks one.
    pub fn stats(&self) -> Option<StatsReport> {
        self.inner.stats()
    }

    /// Hit rate of the underlying stack, when known.
    pub fn hit_rate(&self) -> Option<f64> {
        self.inner.hit_rate()
    }

    /// Resets statistics in the underlying stack.
    pub fn reset_stats(&self) {
        self.inner.reset_stats()
    }
}

// =============================================================================
// Tests
// =============================================================================
