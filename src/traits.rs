//! Core Mapping Contract
//!
//! Every backing store and every decorator implements [`KvStore`]: one
//! byte-keyed contract so that layers can be stacked in any order and still
//! behave as a single coherent mapping.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                        Decorator Stack                           │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  PrefixedCache → StatsCache → LockedCache → EncryptedCache → …   │
//! │        │             │             │              │              │
//! │        └─────────────┴──────┬──────┴──────────────┘              │
//! │                             ▼                                    │
//! │                     Backing store (KvStore)                      │
//! │        in-memory map · remote key-value · TTL remote cache       │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Operations flow top-down through the stack; results and errors flow back
//! up, each layer free to transform keys/values or record statistics on the
//! way.
//!
//! # Capability extensions
//!
//! Stats reporting and raw administrative passthrough are optional
//! capabilities expressed as defaulted methods: a store that does not track
//! statistics reports `None` and composing layers degrade gracefully instead
//! of failing. Decorators forward both so capabilities survive stacking.

use std::sync::Arc;

use bytes::Bytes;

use crate::error::{Error, Result};
use crate::stats::StatsReport;

/// The common mapping contract implemented by every cache component.
///
/// All methods take `&self`; implementations use interior mutability so one
/// store instance can be shared by several decorator stacks (namespace
/// partitioning over a single physical store is a supported pattern).
///
/// # Invariants
///
/// - after `set(k, v)`, `get(k)` returns `v` (absent other writers);
/// - after `delete(k)`, `get(k)` fails with a not-found error;
/// - `get`/`delete` on an absent key fail with [`Error::NotFound`], which is
///   cheap and expected, not an exceptional path.
pub trait KvStore: Send + Sync {
    /// Checks whether a key is present.
    fn contains(&self, key: &[u8]) -> Result<bool> {
        match self.get(key) {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Gets the value stored under a key.
    fn get(&self, key: &[u8]) -> Result<Bytes>;

    /// Stores a value under a key, replacing any previous value.
    fn set(&self, key: &[u8], value: Bytes) -> Result<()>;

    /// Removes a key, failing with [`Error::NotFound`] if it is absent.
    fn delete(&self, key: &[u8]) -> Result<()>;

    /// Returns the number of stored entries.
    fn len(&self) -> Result<usize>;

    /// Returns `true` if the store holds no entries.
    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Enumerates stored keys.
    ///
    /// Stores that cannot enumerate (e.g. hash-keyed remote stores) fail
    /// with [`Error::Unsupported`]; this is a documented limitation, not a
    /// defect.
    fn keys(&self) -> Result<Vec<Bytes>>;

    /// Removes all entries.
    fn clear(&self) -> Result<()>;

    /// Returns a statistics snapshot, or `None` when this store does not
    /// track statistics. Decorators forward the inner store's answer.
    fn stats(&self) -> Option<StatsReport> {
        None
    }

    /// Returns the hit ratio in `[0, 1]`, or `None` when unknown.
    fn hit_rate(&self) -> Option<f64> {
        None
    }

    /// Zeroes statistics counters. Does not clear cached data. No-op for
    /// stores without statistics.
    fn reset_stats(&self) {}

    /// Forwards a store-specific administrative command verbatim (info,
    /// size, direct access with custom options). The library never
    /// interprets these.
    fn raw_command(&self, _name: &str, _args: &[Bytes]) -> Result<Bytes> {
        Err(Error::Unsupported("raw_command"))
    }
}

macro_rules! forward_kv_store {
    () => {
        fn contains(&self, key: &[u8]) -> Result<bool> {
            (**self).contains(key)
        }

        fn get(&self, key: &[u8]) -> Result<Bytes> {
            (**self).get(key)
        }

        fn set(&self, key: &[u8], value: Bytes) -> Result<()> {
            (**self).set(key, value)
        }

        fn delete(&self, key: &[u8]) -> Result<()> {
            (**self).delete(key)
        }

        fn len(&self) -> Result<usize> {
            (**self).len()
        }

        fn keys(&self) -> Result<Vec<Bytes>> {
            (**self).keys()
        }

        fn clear(&self) -> Result<()> {
            (**self).clear()
        }

        fn stats(&self) -> Option<StatsReport> {
            (**self).stats()
        }

        fn hit_rate(&self) -> Option<f64> {
            (**self).hit_rate()
        }

        fn reset_stats(&self) {
            (**self).reset_stats()
        }

        fn raw_command(&self, name: &str, args: &[Bytes]) -> Result<Bytes> {
            (**self).raw_command(name, args)
        }
    };
}

impl<S: KvStore + ?Sized> KvStore for Arc<S> {
    forward_kv_store!();
}

impl<S: KvStore + ?Sized> KvStore for Box<S> {
    forward_kv_store!();
}

// =============================================================================
// Tests
// =============================================================================
