//! Statistics Layer
//!
//! Operation counters and a uniform, composable stats-reporting protocol.
//!
//! [`StatsCache`] counts reads, writes, deletes, membership tests and hits
//! for whatever it wraps. [`StatsReport`] is the snapshot exchanged between
//! layers: its `type` discriminator lets composing layers (the two-level
//! cache) detect whether children expose compatible simple counters and
//! aggregate hit counts, or degrade gracefully when they do not.

use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;
use serde::Serialize;

use crate::error::Result;
use crate::traits::KvStore;

// =============================================================================
// Snapshot types
// =============================================================================

/// Plain operation counters captured by a single stats layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CounterStats {
    /// Membership tests (`contains`).
    pub tests: u64,
    /// Read attempts (`get`), hits and misses alike.
    pub reads: u64,
    /// Writes (`set`).
    pub writes: u64,
    /// Deletions (`delete`).
    pub deletes: u64,
    /// Successful reads.
    pub hits: u64,
    /// `hits / max(reads, 1)`.
    pub hit_rate: f64,
    /// Entry count of the wrapped store, when it could be determined.
    pub size: Option<u64>,
}

/// Structured stats snapshot tagged with a layer-type discriminator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StatsReport {
    /// A single layer's counters.
    Simple(CounterStats),
    /// A two-level cache's per-tier snapshots. A `None` tier means that
    /// tier does not report statistics; aggregation degrades gracefully
    /// instead of failing.
    Tiered {
        tier1: Option<Box<StatsReport>>,
        tier2: Option<Box<StatsReport>>,
    },
}

impl StatsReport {
    /// Returns the simple counters if this is a `Simple` report.
    pub fn as_simple(&self) -> Option<&CounterStats> {
        match self {
            StatsReport::Simple(c) => Some(c),
            StatsReport::Tiered { .. } => None,
        }
    }

    /// Combined hit rate of a tiered report:
    /// `(hits1 + hits2) / max(reads1 + reads2, 1)`.
    ///
    /// Only computable when both tiers expose simple counters; `None`
    /// otherwise ("unknown", not zero).
    pub fn combined_hit_rate(&self) -> Option<f64> {
        match self {
            StatsReport::Simple(c) => Some(c.hit_rate),
            StatsReport::Tiered { tier1, tier2 } => {
                let c1 = tier1.as_deref()?.as_simple()?;
                let c2 = tier2.as_deref()?.as_simple()?;
                let reads = c1.reads + c2.reads;
                Some((c1.hits + c2.hits) as f64 / reads.max(1) as f64)
            }
        }
    }
}

// =============================================================================
// StatsCache
// =============================================================================

/// Decorator that counts operations on the mapping it wraps.
///
/// Counters are updated atomically per operation; under a concurrency guard
/// they inherit the guard's total order.
///
/// ```
/// use bytes::Bytes;
/// use cachestack::{KvStore, MemoryStore, StatsCache};
///
/// let cache = StatsCache::new(MemoryStore::new());
/// cache.set(b"k", Bytes::from_static(b"v")).unwrap();
/// cache.get(b"k").unwrap();
/// assert_eq!(cache.hit_rate(), Some(1.0));
/// ```
pub struct StatsCache<S> {
    inner: S,
    tests: AtomicU64,
    reads: AtomicU64,
    writes: AtomicU64,
    deletes: AtomicU64,
    hits: AtomicU64,
}

impl<S: KvStore> StatsCache<S> {
    /// Wraps a store with zeroed counters.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            tests: AtomicU64::new(0),
            reads: AtomicU64::new(0),
            writes: AtomicU64::new(0),
            deletes: AtomicU64::new(0),
            hits: AtomicU64::new(0),
        }
    }

    /// Consumes the decorator and returns the wrapped store.
    pub fn into_inner(self) -> S {
        self.inner
    }

    fn snapshot(&self) -> CounterStats {
        let reads = self.reads.load(Ordering::Relaxed);
        let hits = self.hits.load(Ordering::Relaxed);
        CounterStats {
            tests: self.tests.load(Ordering::Relaxed),
            reads,
            writes: self.writes.load(Ordering::Relaxed),
            deletes: self.deletes.load(Ordering::Relaxed),
            hits,
            hit_rate: hits as f64 / reads.max(1) as f64,
            size: self.inner.len().ok().map(|n| n as u64),
        }
    }
}

impl<S: KvStore> KvStore for StatsCache<S> {
    fn contains(&self, key: &[u8]) -> Result<bool> {
        self.tests.fetch_add(1, Ordering::Relaxed);
        self.inner.contains(key)
    }

    fn get(&self, key: &[u8]) -> Result<Bytes> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        let value = self.inner.get(key)?;
        self.hits.fetch_add(1, Ordering::Relaxed);
        Ok(value)
    }

    fn set(&self, key: &[u8], value: Bytes) -> Result<()> {
        self.writes.fetch_add(1, Ordering::Relaxed);
        self.inner.set(key, value)
    }

    fn delete(&self, key: &[u8]) -> Result<()> {
        self.deletes.fetch_add(1, Ordering::Relaxed);
        self.inner.delete(key)
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
        Some(StatsReport::Simple(self.snapshot()))
    }

    fn hit_rate(&self) -> Option<f64> {
        let reads = self.reads.load(Ordering::Relaxed);
        let hits = self.hits.load(Ordering::Relaxed);
        Some(hits as f64 / reads.max(1) as f64)
    }

    fn reset_stats(&self) {
        self.tests.store(0, Ordering::Relaxed);
        self.reads.store(0, Ordering::Relaxed);
        self.writes.store(0, Ordering::Relaxed);
        self.deletes.store(0, Ordering::Relaxed);
        self.hits.store(0, Ordering::Relaxed);
    }

    fn raw_command(&self, name: &str, args: &[Bytes]) -> Result<Bytes> {
        self.inner.raw_command(name, args)
    }
}

// =============================================================================
// Tests
// =============================================================================
