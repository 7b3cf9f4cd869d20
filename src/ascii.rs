//! ASCII-Safe Codec
//!
//! Some backing stores only accept short, printable keys without control
//! characters or spaces (a 250-byte ASCII limit is typical for memcached
//! style servers). [`AsciiCache`] base64-encodes keys and values before they
//! reach the inner mapping, keeping arbitrary binary data usable behind such
//! constraints without hashing (no collision risk, no digest cost).

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use bytes::Bytes;

use crate::error::{Error, Result};
use crate::stats::StatsReport;
use crate::traits::KvStore;

/// Decorator that renders keys and values as printable ASCII.
pub struct AsciiCache<S> {
    inner: S,
}

impl<S: KvStore> AsciiCache<S> {
    /// Wraps a store whose keys and values must stay printable.
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    /// Consumes the decorator and returns the wrapped store.
    pub fn into_inner(self) -> S {
        self.inner
    }

    fn encode(&self, raw: &[u8]) -> Vec<u8> {
        BASE64.encode(raw).into_bytes()
    }

    fn decode(&self, stored: &[u8]) -> Result<Bytes> {
        BASE64
            .decode(stored)
            .map(Bytes::from)
            .map_err(|e| Error::Serialization(format!("stored value is not base64: {e}")))
    }
}

impl<S: KvStore> KvStore for AsciiCache<S> {
    fn contains(&self, key: &[u8]) -> Result<bool> {
        self.inner.contains(&self.encode(key))
    }

    fn get(&self, key: &[u8]) -> Result<Bytes> {
        let stored = self.inner.get(&self.encode(key))?;
        self.decode(&stored)
    }

    fn set(&self, key: &[u8], value: Bytes) -> Result<()> {
        self.inner
            .set(&self.encode(key), Bytes::from(self.encode(&value)))
    }

    fn delete(&self, key: &[u8]) -> Result<()> {
        self.inner.delete(&self.encode(key))
    }

    fn len(&self) -> Result<usize> {
        self.inner.len()
    }

    fn keys(&self) -> Result<Vec<Bytes>> {
        self.inner.keys()
    }

    fn clear(&self) -> Result<()> {
        self.inner.clear()
    }

    fn stats(&self) -> Option<StatsReport> {
        self.inner.stats()
    }

    fn hit_rate(&self) -> Option<f64> {
        self.inner.hit_rate()
    }

    fn reset_stats(&self) {
        self.inner.reset_stats()
    }

    fn raw_command(&self, name: &str, args: &[Bytes]) -> Result<Bytes> {
        self.inner.raw_command(name, args)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use assert_matches::assert_matches;
    use std::sync::Arc;

    #[test]
    fn test_binary_roundtrip() {
        let cache = AsciiCache::new(MemoryStore::new());
        let key = [0u8, 1, 2, 255, 254];
        let value = Bytes::from(vec![9u8, 0, 13, 10, 200]);

        cache.set(&key, value.clone()).unwrap();
        assert_eq!(cache.get(&key).unwrap(), value);
    }

    #[test]
    fn test_underlying_keys_are_printable() {
        let store = Arc::new(MemoryStore::new());
        let cache = AsciiCache::new(Arc::clone(&store));

        cache
            .set(&[0u8, 31, 127, 200], Bytes::from_static(b"\x00\x01"))
            .unwrap();

        for key in store.keys().unwrap() {
            assert!(key
                .iter()
                .all(|b| b.is_ascii() && !b.is_ascii_control() && *b != b' '));
        }
        // Values too.
        for key in store.keys().unwrap() {
            let value = store.get(&key).unwrap();
            assert!(value.iter().all(|b| b.is_ascii() && !b.is_ascii_control()));
        }
    }

    #[test]
    fn test_contains_and_delete_use_encoded_keys() {
        let store = Arc::new(MemoryStore::new());
        let cache = AsciiCache::new(Arc::clone(&store));

        cache.set(b"raw", Bytes::from_static(b"v")).unwrap();
        assert!(cache.contains(b"raw").unwrap());
        assert!(!store.contains(b"raw").unwrap());

        cache.delete(b"raw").unwrap();
        assert!(!cache.contains(b"raw").unwrap());
        assert_matches!(cache.delete(b"raw"), Err(Error::NotFound));
    }

    #[test]
    fn test_foreign_value_is_a_serialization_failure() {
        let store = Arc::new(MemoryStore::new());
        let cache = AsciiCache::new(Arc::clone(&store));

        // Something else wrote a non-base64 value under our encoded key.
        let encoded = BASE64.encode(b"k").into_bytes();
        store
            .set(&encoded, Bytes::from_static(b"!!not-base64!!"))
            .unwrap();

        assert_matches!(cache.get(b"k"), Err(Error::Serialization(_)));
    }
}
