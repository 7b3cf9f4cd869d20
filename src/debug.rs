//! Debug Layer
//!
//! Transparent decorator that logs every operation through `tracing` before
//! delegating. Useful while assembling a stack to see exactly which keys a
//! layer produces for the layer below it.

use bytes::Bytes;
use tracing::{debug, info};

use crate::error::Result;
use crate::stats::StatsReport;
use crate::traits::KvStore;

/// Renders a key for log output without assuming valid UTF-8.
fn display_key(key: &[u8]) -> String {
    String::from_utf8_lossy(key).into_owned()
}

/// Decorator logging each operation at debug level.
pub struct DebugCache<S> {
    inner: S,
    name: String,
}

impl<S: KvStore> DebugCache<S> {
    /// Wraps a store under an instance name used in log output.
    pub fn new(inner: S, name: impl Into<String>) -> Self {
        let name = name.into();
        info!(cache = %name, "DebugCache: init");
        Self { inner, name }
    }

    /// Consumes the decorator and returns the wrapped store.
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: KvStore> KvStore for DebugCache<S> {
    fn contains(&self, key: &[u8]) -> Result<bool> {
        debug!(cache = %self.name, key = %display_key(key), "contains");
        self.inner.contains(key)
    }

    fn get(&self, key: &[u8]) -> Result<Bytes> {
        debug!(cache = %self.name, key = %display_key(key), "get");
        self.inner.get(key)
    }

    fn set(&self, key: &[u8], value: Bytes) -> Result<()> {
        debug!(
            cache = %self.name,
            key = %display_key(key),
            value_len = value.len(),
            "set"
        );
        self.inner.set(key, value)
    }

    fn delete(&self, key: &[u8]) -> Result<()> {
        debug!(cache = %self.name, key = %display_key(key), "delete");
        self.inner.delete(key)
    }

    fn len(&self) -> Result<usize> {
        debug!(cache = %self.name, "len");
        self.inner.len()
    }

    fn keys(&self) -> Result<Vec<Bytes>> {
        debug!(cache = %self.name, "keys");
        self.inner.keys()
    }

    fn clear(&self) -> Result<()> {
        debug!(cache = %self.name, "clear");
        self.inner.clear()
    }

    fn stats(&self) -> Option<StatsReport> {
        debug!(cache = %self.name, "stats");
        self.inner.stats()
    }

    fn hit_rate(&self) -> Option<f64> {
        self.inner.hit_rate()
    }

    fn reset_stats(&self) {
        debug!(cache = %self.name, "reset_stats");
        self.inner.reset_stats()
    }

    fn raw_command(&self, name: &str, args: &[Bytes]) -> Result<Bytes> {
        debug!(cache = %self.name, command = name, "raw_command");
        self.inner.raw_command(name, args)
    }
}

// =============================================================================
// Tests
// =============================================================================
