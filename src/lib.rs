//! cachestack - Stackable Key-Value Cache Middleware
//!
//! A uniform cache abstraction over heterogeneous backing stores, plus
//! cross-cutting behaviors composed as stackable decorators: every layer
//! implements the same mapping contract while delegating to an inner
//! mapping, so layers combine in any order and still behave as one coherent
//! cache.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                          Caller / CachedFn                          │
//! ├─────────────────────────────────────────────────────────────────────┤
//! │ JsonCache (typed keys/values)                                       │
//! │   └─ PrefixedCache (namespace)                                      │
//! │        └─ StatsCache (counters)                                     │
//! │             └─ TwoLevelCache ──┬─ tier1: LockedCache(MemoryStore)   │
//! │                                └─ tier2: EncryptedCache(remote KV)  │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Operations flow top-down, results and errors flow back up; each layer
//! may transform keys and values or record statistics on the way.
//!
//! # Example
//!
//! ```
//! use bytes::Bytes;
//! use cachestack::{KvStore, MemoryStore, PrefixedCache, StatsCache};
//!
//! let cache = PrefixedCache::new(StatsCache::new(MemoryStore::new()), "app.");
//! cache.set(b"answer", Bytes::from_static(b"42")).unwrap();
//! assert_eq!(cache.get(b"answer").unwrap(), Bytes::from_static(b"42"));
//! assert_eq!(cache.hit_rate(), Some(1.0));
//! ```
//!
//! # Modules
//!
//! - [`traits`] - the mapping contract every component implements
//! - [`error`] - error taxonomy
//! - [`memory`] - in-memory backing store
//! - [`stats`] - operation counters and composable stats snapshots
//! - [`prefix`] - key prefixing and automatic prefix allocation
//! - [`json`] - canonical JSON codec and typed facade
//! - [`ascii`] - printable-ASCII key/value codec for constrained stores
//! - [`locked`] - exclusive-lock concurrency guard
//! - [`debug`] - operation logging layer
//! - [`tiered`] - two-level cache with partial-failure resilience
//! - [`encrypted`] - per-key derived encryption with integrity checksum
//! - [`memo`] - function-result caching facade

pub mod ascii;
pub mod debug;
pub mod encrypted;
pub mod error;
pub mod json;
pub mod locked;
pub mod memo;
pub mod memory;
pub mod prefix;
pub mod stats;
pub mod tiered;
pub mod traits;

// Re-export commonly used types
pub use ascii::AsciiCache;
pub use debug::DebugCache;
pub use encrypted::{CipherKind, EncryptedCache};
pub use error::{Error, Result};
pub use json::{canonical_json, canonical_json_bytes, JsonCache};
pub use locked::LockedCache;
pub use memo::{CachedFn, CachedGroup, KeyFormat};
pub use memory::MemoryStore;
pub use prefix::{PrefixEncoding, PrefixedCache};
pub use stats::{CounterStats, StatsCache, StatsReport};
pub use tiered::TwoLevelCache;
pub use traits::KvStore;
