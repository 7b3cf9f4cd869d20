//! Concurrency Guard
//!
//! Serializes access to an inner mapping under one exclusive lock. Reads
//! take the same lock as writes: the inner store's own concurrency behavior
//! is unknown, so correctness wins over throughput.
//!
//! # Placement
//!
//! The guard belongs directly around the raw, non-thread-safe store. It
//! serializes individual operations only; a tiered cache's multi-step read
//! (tier1 miss, tier2 read, backfill) is atomic as a whole only if the guard
//! wraps the tiered cache itself, which is a caller choice, not automatic.

use std::sync::Arc;

use bytes::Bytes;
use parking_lot::Mutex;

use crate::error::Result;
use crate::stats::StatsReport;
use crate::traits::KvStore;

/// Decorator running every operation under one exclusive lock.
///
/// The lock is released on every exit path, including error returns. A
/// shared lock handle (see [`LockedCache::with_lock`]) lets several guarded
/// views of one physical store serialize against each other.
pub struct LockedCache<S> {
    inner: S,
    lock: Arc<Mutex<()>>,
}

impl<S: KvStore> LockedCache<S> {
    /// Wraps a store with a fresh private lock.
    pub fn new(inner: S) -> Self {
        Self::with_lock(inner, Arc::new(Mutex::new(())))
    }

    /// Wraps a store with a caller-provided lock handle.
    pub fn with_lock(inner: S, lock: Arc<Mutex<()>>) -> Self {
        Self { inner, lock }
    }

    /// Returns the lock handle, for sharing with other guarded views.
    pub fn lock_handle(&self) -> Arc<Mutex<()>> {
        Arc::clone(&self.lock)
    }

    /// Consumes the decorator and returns the wrapped store.
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: KvStore> KvStore for LockedCache<S> {
    fn contains(&self, key: &[u8]) -> Result<bool> {
        let _guard = self.lock.lock();
        self.inner.contains(key)
    }

    fn get(&self, key: &[u8]) -> Result<Bytes> {
        let _guard = self.lock.lock();
        self.inner.get(key)
    }

    fn set(&self, key: &[u8], value: Bytes) -> Result<()> {
        let _guard = self.lock.lock();
        self.inner.set(key, value)
    }

    fn delete(&self, key: &[u8]) -> Result<()> {
        let _guard = self.lock.lock();
        self.inner.delete(key)
    }

    fn len(&self) -> Result<usize> {
        let _guard = self.lock.lock();
        self.inner.len()
    }

    fn keys(&self) -> Result<Vec<Bytes>> {
        let _guard = self.lock.lock();
        self.inner.keys()
    }

    fn clear(&self) -> Result<()> {
        let _guard = self.lock.lock();
        self.inner.clear()
    }

    fn stats(&self) -> Option<StatsReport> {
        let _guard = self.lock.lock();
        self.inner.stats()
    }

    fn hit_rate(&self) -> Option<f64> {
        let _guard = self.lock.lock();
        self.inner.hit_rate()
    }

    fn reset_stats(&self) {
        let _guard = self.lock.lock();
        self.inner.reset_stats()
    }

    fn raw_command(&self, name: &str, args: &[Bytes]) -> Result<Bytes> {
        let _guard = self.lock.lock();
        self.inner.raw_command(name, args)
    }
}

// =============================================================================
// Tests
// =============================================================================
