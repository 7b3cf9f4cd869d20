//! Two-Level Cache
//!
//! Presents two backing stores as one mapping: a fast/small first tier and a
//! slow/large second tier, with read-through population and configurable
//! fault isolation.
//!
//! # Read path
//!
//! ```text
//! get(key) ── tier1 hit ──────────────────────────────► value
//!     │
//!     └ tier1 miss ── tier2 miss ─────────────────────► original not-found
//!                 ├── tier2 failure, resilient ── log ─► original not-found
//!                 ├── tier2 failure, strict ───────────► failure
//!                 └── tier2 hit ── backfill tier1 ─────► value
//! ```
//!
//! Writes go to tier2 first so the larger tier never silently lags behind;
//! a strict (non-resilient) tier2 write failure aborts before tier1 is
//! touched. The read-then-backfill sequence can race with a concurrent
//! write; a stale backfill is a known hazard of read-through tiering, not a
//! defect. Wrap the whole tiered cache in a lock guard if that matters.

use bytes::Bytes;
use tracing::debug;

use crate::error::Result;
use crate::stats::StatsReport;
use crate::traits::KvStore;

/// Tiered read-through/write-through cache over two stores.
///
/// With `resilient` set, failures of the second tier (other than a plain
/// miss) are logged and absorbed, and operations proceed on the first tier
/// alone. First-tier failures always propagate.
///
/// `clear` empties the first tier only: the second tier is assumed shared
/// and larger, not owned exclusively by this cache. `contains`, `len` and
/// `keys` report the first tier.
pub struct TwoLevelCache<S1, S2> {
    tier1: S1,
    tier2: S2,
    resilient: bool,
}

impl<S1: KvStore, S2: KvStore> TwoLevelCache<S1, S2> {
    /// Combines two stores; tier2 failures propagate.
    pub fn new(tier1: S1, tier2: S2) -> Self {
        Self::with_resilience(tier1, tier2, false)
    }

    /// Combines two stores with explicit resilience to tier2 failures.
    pub fn with_resilience(tier1: S1, tier2: S2, resilient: bool) -> Self {
        Self {
            tier1,
            tier2,
            resilient,
        }
    }

    /// Whether tier2 failures are absorbed.
    pub fn is_resilient(&self) -> bool {
        self.resilient
    }

    /// Returns references to both tiers.
    pub fn tiers(&self) -> (&S1, &S2) {
        (&self.tier1, &self.tier2)
    }

    /// Consumes the cache and returns both tiers.
    pub fn into_tiers(self) -> (S1, S2) {
        (self.tier1, self.tier2)
    }
}

impl<S1: KvStore, S2: KvStore> KvStore for TwoLevelCache<S1, S2> {
    fn contains(&self, key: &[u8]) -> Result<bool> {
        self.tier1.contains(key)
    }

    fn get(&self, key: &[u8]) -> Result<Bytes> {
        let miss = match self.tier1.get(key) {
            Ok(value) => return Ok(value),
            Err(e) if e.is_not_found() => e,
            Err(e) => return Err(e),
        };

        let value = match self.tier2.get(key) {
            Ok(value) => value,
            // Absent in both tiers: report the tier1 miss so callers see a
            // uniform not-found regardless of which tier produced it.
            Err(e) if e.is_not_found() => return Err(miss),
            Err(e) => {
                if self.resilient {
                    debug!(error = %e, "tier2 read failed, treating as miss");
                    return Err(miss);
                }
                return Err(e);
            }
        };

        self.tier1.set(key, value.clone())?;
        Ok(value)
    }

    fn set(&self, key: &[u8], value: Bytes) -> Result<()> {
        if let Err(e) = self.tier2.set(key, value.clone()) {
            if !self.resilient {
                return Err(e);
            }
            debug!(error = %e, "tier2 write failed, continuing on tier1");
        }
        self.tier1.set(key, value)
    }

    fn delete(&self, key: &[u8]) -> Result<()> {
        match self.tier2.delete(key) {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {}
            Err(e) => {
                if !self.resilient {
                    return Err(e);
                }
                debug!(error = %e, "tier2 delete failed, continuing on tier1");
            }
        }
        self.tier1.delete(key)
    }

    fn len(&self) -> Result<usize> {
        self.tier1.len()
    }

    fn keys(&self) -> Result<Vec<Bytes>> {
        self.tier1.keys()
    }

    fn clear(&self) -> Result<()> {
        self.tier1.clear()
    }

    fn stats(&self) -> Option<StatsReport> {
        Some(StatsReport::Tiered {
            tier1: self.tier1.stats().map(Box::new),
            tier2: self.tier2.stats().map(Box::new),
        })
    }

    fn hit_rate(&self) -> Option<f64> {
        // Only computable when both tiers expose compatible simple stats.
        self.stats()?.combined_hit_rate()
    }

    fn reset_stats(&self) {
        self.tier1.reset_stats();
        self.tier2.reset_stats();
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::memory::MemoryStore;
    use crate::stats::StatsCache;
    use assert_matches::assert_matches;
    use std::sync::Arc;

    /// Store whose every operation fails with a backing-store error.
    struct BrokenStore;

    impl KvStore for BrokenStore {
        fn get(&self, _key: &[u8]) -> Result<Bytes> {
            Err(Error::backing("connection refused"))
        }

        fn set(&self, _key: &[u8], _value: Bytes) -> Result<()> {
            Err(Error::backing("connection refused"))
        }

        fn delete(&self, _key: &[u8]) -> Result<()> {
            Err(Error::backing("connection refused"))
        }

        fn len(&self) -> Result<usize> {
            Err(Error::backing("connection refused"))
        }

        fn keys(&self) -> Result<Vec<Bytes>> {
            Err(Error::backing("connection refused"))
        }

        fn clear(&self) -> Result<()> {
            Err(Error::backing("connection refused"))
        }
    }

    fn value(text: &'static str) -> Bytes {
        Bytes::from_static(text.as_bytes())
    }

    #[test]
    fn test_get_hits_tier1_without_touching_tier2() {
        let tier2 = Arc::new(StatsCache::new(MemoryStore::new()));
        let tier1 = MemoryStore::new();
        tier1.set(b"k", value("v1")).unwrap();

        let cache = TwoLevelCache::new(tier1, Arc::clone(&tier2));
        assert_eq!(cache.get(b"k").unwrap(), value("v1"));

        let t2 = tier2.stats().unwrap().as_simple().unwrap().clone();
        assert_eq!(t2.reads, 0);
    }

    #[test]
    fn test_get_backfills_tier1_from_tier2() {
        let tier1 = Arc::new(MemoryStore::new());
        let tier2 = MemoryStore::new();
        tier2.set(b"k", value("warm")).unwrap();

        let cache = TwoLevelCache::new(Arc::clone(&tier1), tier2);
        assert_eq!(cache.get(b"k").unwrap(), value("warm"));

        // Next read must come from tier1.
        assert_eq!(tier1.get(b"k").unwrap(), value("warm"));
    }

    #[test]
    fn test_double_miss_reports_not_found() {
        let cache = TwoLevelCache::new(MemoryStore::new(), MemoryStore::new());
        assert_matches!(cache.get(b"absent"), Err(Error::NotFound));
    }

    #[test]
    fn test_strict_mode_propagates_tier2_failures() {
        let cache = TwoLevelCache::new(MemoryStore::new(), BrokenStore);

        assert_matches!(cache.get(b"k"), Err(Error::Backing(_)));
        assert_matches!(cache.set(b"k", value("v")), Err(Error::Backing(_)));
        assert_matches!(cache.delete(b"k"), Err(Error::Backing(_)));
    }

    #[test]
    fn test_strict_set_failure_skips_tier1() {
        let tier1 = Arc::new(MemoryStore::new());
        let cache = TwoLevelCache::new(Arc::clone(&tier1), BrokenStore);

        cache.set(b"k", value("v")).unwrap_err();
        assert!(!tier1.contains(b"k").unwrap());
    }

    #[test]
    fn test_resilient_mode_runs_on_tier1_alone() {
        let cache = TwoLevelCache::with_resilience(MemoryStore::new(), BrokenStore, true);

        cache.set(b"k", value("v")).unwrap();
        assert_eq!(cache.get(b"k").unwrap(), value("v"));
        cache.delete(b"k").unwrap();
        // Gone from tier1, and tier2's failure stays invisible.
        assert_matches!(cache.get(b"k"), Err(Error::NotFound));
    }

    #[test]
    fn test_resilient_miss_is_original_not_found() {
        let cache = TwoLevelCache::with_resilience(MemoryStore::new(), BrokenStore, true);
        assert_matches!(cache.get(b"absent"), Err(Error::NotFound));
    }

    #[test]
    fn test_set_writes_both_tiers() {
        let tier1 = Arc::new(MemoryStore::new());
        let tier2 = Arc::new(MemoryStore::new());
        let cache = TwoLevelCache::new(Arc::clone(&tier1), Arc::clone(&tier2));

        cache.set(b"k", value("v")).unwrap();
        assert_eq!(tier1.get(b"k").unwrap(), value("v"));
        assert_eq!(tier2.get(b"k").unwrap(), value("v"));
    }

    #[test]
    fn test_delete_ignores_tier2_absence() {
        let tier1 = MemoryStore::new();
        tier1.set(b"k", value("v")).unwrap();
        let cache = TwoLevelCache::new(tier1, MemoryStore::new());

        // Present only in tier1: tier2's not-found is silently ignored.
        cache.delete(b"k").unwrap();
        assert_matches!(cache.get(b"k"), Err(Error::NotFound));
    }

    #[test]
    fn test_delete_removes_from_both_tiers() {
        let tier1 = Arc::new(MemoryStore::new());
        let tier2 = Arc::new(MemoryStore::new());
        let cache = TwoLevelCache::new(Arc::clone(&tier1), Arc::clone(&tier2));

        cache.set(b"k", value("v")).unwrap();
        cache.delete(b"k").unwrap();
        assert!(!tier1.contains(b"k").unwrap());
        assert!(!tier2.contains(b"k").unwrap());
    }

    #[test]
    fn test_clear_spares_tier2() {
        let tier2 = Arc::new(MemoryStore::new());
        let cache = TwoLevelCache::new(MemoryStore::new(), Arc::clone(&tier2));

        cache.set(b"k", value("v")).unwrap();
        cache.clear().unwrap();

        assert_eq!(cache.len().unwrap(), 0);
        assert!(tier2.contains(b"k").unwrap());
        // A read repopulates tier1 from the spared tier2.
        assert_eq!(cache.get(b"k").unwrap(), value("v"));
    }

    #[test]
    fn test_stats_report_is_tiered() {
        let cache = TwoLevelCache::new(
            StatsCache::new(MemoryStore::new()),
            StatsCache::new(MemoryStore::new()),
        );

        cache.set(b"k", value("v")).unwrap();
        cache.get(b"k").unwrap();

        match cache.stats().unwrap() {
            StatsReport::Tiered { tier1, tier2 } => {
                let t1 = tier1.unwrap();
                let t1 = t1.as_simple().unwrap();
                assert_eq!(t1.reads, 1);
                assert_eq!(t1.hits, 1);
                let t2 = tier2.unwrap();
                let t2 = t2.as_simple().unwrap();
                assert_eq!(t2.writes, 1);
            }
            other => panic!("expected tiered report, got {other:?}"),
        }
    }

    #[test]
    fn test_stats_degrade_gracefully_without_counters() {
        let cache = TwoLevelCache::new(MemoryStore::new(), StatsCache::new(MemoryStore::new()));

        match cache.stats().unwrap() {
            StatsReport::Tiered { tier1, tier2 } => {
                assert!(tier1.is_none());
                assert!(tier2.is_some());
            }
            other => panic!("expected tiered report, got {other:?}"),
        }
    }

    #[test]
    fn test_hit_rate_combines_both_tiers() {
        let cache = TwoLevelCache::new(
            StatsCache::new(MemoryStore::new()),
            StatsCache::new(MemoryStore::new()),
        );

        cache.set(b"k", value("v")).unwrap();
        cache.get(b"k").unwrap(); // tier1 hit
        let _ = cache.get(b"absent"); // miss in both tiers

        // tier1: 2 reads 1 hit; tier2: 1 read 0 hits → 1/3.
        let rate = cache.hit_rate().unwrap();
        assert!((rate - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_hit_rate_unknown_without_compatible_stats() {
        let cache = TwoLevelCache::new(MemoryStore::new(), StatsCache::new(MemoryStore::new()));
        assert_eq!(cache.hit_rate(), None);
    }

    #[test]
    fn test_reset_stats_reaches_both_tiers() {
        let tier1 = Arc::new(StatsCache::new(MemoryStore::new()));
        let tier2 = Arc::new(StatsCache::new(MemoryStore::new()));
        let cache = TwoLevelCache::new(Arc::clone(&tier1), Arc::clone(&tier2));

        cache.set(b"k", value("v")).unwrap();
        cache.get(b"k").unwrap();
        cache.reset_stats();

        assert_eq!(tier1.stats().unwrap().as_simple().unwrap().reads, 0);
        assert_eq!(tier2.stats().unwrap().as_simple().unwrap().writes, 0);
    }
}
