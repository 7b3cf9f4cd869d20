//! Key Prefixing
//!
//! Namespace partitioning over a shared store: every key is prepended with a
//! fixed prefix before it reaches the inner mapping. By convention the
//! prefix ends in a separator character (default `.`) so namespaces sharing
//! one physical store stay unambiguously separable.
//!
//! [`PrefixedCache::auto`] allocates short, process-unique prefixes from a
//! shared counter, so callers get distinct namespaces without coordinating
//! prefix strings.

use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use base64::engine::general_purpose::{STANDARD as BASE64, URL_SAFE_NO_PAD as BASE64_URL};
use base64::Engine;
use bytes::Bytes;
use data_encoding::{BASE32, BASE32HEX, HEXUPPER};

use crate::error::{Error, Result};
use crate::stats::StatsReport;
use crate::traits::KvStore;

/// Next automatic prefix ordinal, shared by every [`PrefixedCache::auto`]
/// call in the process. Never reused.
static NEXT_PREFIX: AtomicU64 = AtomicU64::new(0);

// =============================================================================
// Prefix encodings
// =============================================================================

/// Binary-to-text encodings for automatic prefix allocation.
///
/// Adding a variant extends the menu without touching the allocation
/// protocol itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrefixEncoding {
    /// Standard base64 (`b64`).
    Base64,
    /// URL-safe base64, unpadded (`b64u`).
    Base64Url,
    /// RFC 4648 base32 (`b32`).
    Base32,
    /// Base32 with the extended hex alphabet (`b32x`).
    Base32Hex,
    /// Uppercase hexadecimal (`b16`).
    Base16,
}

impl PrefixEncoding {
    /// Renders raw bytes in this encoding.
    pub fn encode(&self, raw: &[u8]) -> String {
        match self {
            PrefixEncoding::Base64 => BASE64.encode(raw),
            PrefixEncoding::Base64Url => BASE64_URL.encode(raw),
            PrefixEncoding::Base32 => BASE32.encode(raw),
            PrefixEncoding::Base32Hex => BASE32HEX.encode(raw),
            PrefixEncoding::Base16 => HEXUPPER.encode(raw),
        }
    }

    /// Method identifier accepted by [`PrefixedCache::auto`].
    pub fn name(&self) -> &'static str {
        match self {
            PrefixEncoding::Base64 => "b64",
            PrefixEncoding::Base64Url => "b64u",
            PrefixEncoding::Base32 => "b32",
            PrefixEncoding::Base32Hex => "b32x",
            PrefixEncoding::Base16 => "b16",
        }
    }
}

impl FromStr for PrefixEncoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "b64" => Ok(PrefixEncoding::Base64),
            "b64u" => Ok(PrefixEncoding::Base64Url),
            "b32" => Ok(PrefixEncoding::Base32),
            "b32x" => Ok(PrefixEncoding::Base32Hex),
            "b16" => Ok(PrefixEncoding::Base16),
            other => Err(Error::config(format!(
                "invalid prefix encoding method: {other}"
            ))),
        }
    }
}

/// Minimal big-endian representation of an ordinal, at least one byte.
fn ordinal_bytes(n: u64) -> Vec<u8> {
    let bytes = n.to_be_bytes();
    let skip = bytes.iter().take_while(|b| **b == 0).count().min(7);
    bytes[skip..].to_vec()
}

// =============================================================================
// PrefixedCache
// =============================================================================

/// Decorator that prepends a fixed prefix to every key.
///
/// `len`, `keys` and `clear` act on the whole underlying store, not on the
/// namespace: a prefixed view is a key transform, not a filter.
///
/// ```
/// use bytes::Bytes;
/// use cachestack::{KvStore, MemoryStore, PrefixedCache};
/// use std::sync::Arc;
///
/// let store = Arc::new(MemoryStore::new());
/// let view = PrefixedCache::new(Arc::clone(&store), "f.");
/// view.set(b"x", Bytes::from_static(b"1")).unwrap();
/// assert!(store.contains(b"f.x").unwrap());
/// ```
#[derive(Debug)]
pub struct PrefixedCache<S> {
    inner: S,
    prefix: Bytes,
}

impl<S: KvStore> PrefixedCache<S> {
    /// Wraps a store with the given prefix.
    pub fn new(inner: S, prefix: impl Into<Bytes>) -> Self {
        Self {
            inner,
            prefix: prefix.into(),
        }
    }

    /// Wraps a store with an automatically allocated prefix.
    ///
    /// Draws the next value from a process-wide counter, renders it with the
    /// named encoding `method` (see [`PrefixEncoding`]) and appends `sep`.
    /// Every call yields a distinct namespace; an unknown method name fails
    /// construction.
    pub fn auto(inner: S, sep: &str, method: &str) -> Result<Self> {
        let encoding: PrefixEncoding = method.parse()?;
        let ordinal = NEXT_PREFIX.fetch_add(1, Ordering::Relaxed);
        let mut prefix = encoding.encode(&ordinal_bytes(ordinal));
        prefix.push_str(sep);
        Ok(Self::new(inner, prefix))
    }

    /// Returns the prefix applied to keys.
    pub fn prefix(&self) -> &[u8] {
        &self.prefix
    }

    /// Consumes the decorator and returns the wrapped store.
    pub fn into_inner(self) -> S {
        self.inner
    }

    fn full_key(&self, key: &[u8]) -> Vec<u8> {
        let mut full = Vec::with_capacity(self.prefix.len() + key.len());
        full.extend_from_slice(&self.prefix);
        full.extend_from_slice(key);
        full
    }
}

impl<S: KvStore> KvStore for PrefixedCache<S> {
    fn contains(&self, key: &[u8]) -> Result<bool> {
        self.inner.contains(&self.full_key(key))
    }

    fn get(&self, key: &[u8]) -> Result<Bytes> {
        self.inner.get(&self.full_key(key))
    }

    fn set(&self, key: &[u8], value: Bytes) -> Result<()> {
        self.inner.set(&self.full_key(key), value)
    }

    fn delete(&self, key: &[u8]) -> Result<()> {
        self.inner.delete(&self.full_key(key))
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
