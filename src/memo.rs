//! Function-Result Caching
//!
//! Wraps a callable so repeated calls with equal arguments reuse a cached
//! result, with existence checks and invalidation keyed by the same
//! arguments. Memoization is only correct for pure functions of their
//! arguments; that contract stays with the caller and is not enforced here.
//!
//! The source-of-truth key is the canonical JSON rendering of the argument
//! tuple, so equal composite arguments always map to the same entry, across
//! processes and languages. [`CachedGroup`] namespaces several wrapped
//! callables over one shared cache through explicit prefix registration
//! rather than rewriting anything in place.

use std::collections::HashMap;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};
use crate::json::{canonical_json, canonical_json_bytes};
use crate::prefix::PrefixedCache;
use crate::traits::KvStore;

// =============================================================================
// Argument keys
// =============================================================================

/// How call arguments become cache keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KeyFormat {
    /// Canonical JSON of the argument tuple (default). Keys are readable
    /// and stable across processes.
    #[default]
    Json,
    /// 128-bit truncated SHA-256 of the canonical JSON, rendered in base64.
    /// Fixed-size keys for stores that dislike long ones.
    HashedJson,
}

impl KeyFormat {
    /// Renders an argument tuple as key bytes.
    pub fn render<A: Serialize + ?Sized>(&self, args: &A) -> Result<Vec<u8>> {
        let json = canonical_json(args)?;
        match self {
            KeyFormat::Json => Ok(json.into_bytes()),
            KeyFormat::HashedJson => {
                let digest = Sha256::digest(json.as_bytes());
                Ok(BASE64.encode(&digest[..16]).into_bytes())
            }
        }
    }
}

// =============================================================================
// CachedFn
// =============================================================================

/// A callable memoized through any mapping.
///
/// ```
/// use cachestack::{CachedFn, MemoryStore};
///
/// let square = CachedFn::new(MemoryStore::new(), |n: &u64| n * n);
/// assert_eq!(square.call(&12).unwrap(), 144);
/// assert!(square.is_cached(&12).unwrap());
/// assert!(square.invalidate(&12).unwrap());
/// assert!(!square.is_cached(&12).unwrap());
/// ```
pub struct CachedFn<S, F> {
    cache: S,
    func: F,
    key_format: KeyFormat,
}

impl<S: KvStore, F> CachedFn<S, F> {
    /// Memoizes `func` through `cache` with JSON argument keys.
    pub fn new(cache: S, func: F) -> Self {
        Self::with_key_format(cache, func, KeyFormat::Json)
    }

    /// Memoizes `func` with an explicit argument-key format.
    pub fn with_key_format(cache: S, func: F, key_format: KeyFormat) -> Self {
        Self {
            cache,
            func,
            key_format,
        }
    }

    /// The mapping holding cached results.
    pub fn cache(&self) -> &S {
        &self.cache
    }

    fn key<A: Serialize>(&self, args: &A) -> Result<Vec<u8>> {
        self.key_format.render(args)
    }

    /// Calls through the cache: a present key returns the stored result
    /// without invoking the callable, a missing one invokes it and stores
    /// the result.
    pub fn call<A, R>(&self, args: &A) -> Result<R>
    where
        F: Fn(&A) -> R,
        A: Serialize,
        R: Serialize + DeserializeOwned,
    {
        let key = self.key(args)?;
        match self.cache.get(&key) {
            Ok(raw) => Ok(serde_json::from_slice(&raw)?),
            Err(e) if e.is_not_found() => {
                let result = (self.func)(args);
                self.cache.set(&key, canonical_json_bytes(&result)?)?;
                Ok(result)
            }
            Err(e) => Err(e),
        }
    }

    /// Whether a result is currently cached for these arguments. No side
    /// effects, the callable is not invoked.
    pub fn is_cached<A: Serialize>(&self, args: &A) -> Result<bool> {
        self.cache.contains(&self.key(args)?)
    }

    /// Removes the cached result for these arguments if present; returns
    /// whether it was there.
    pub fn invalidate<A: Serialize>(&self, args: &A) -> Result<bool> {
        match self.cache.delete(&self.key(args)?) {
            Ok(()) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }
}

// =============================================================================
// CachedGroup
// =============================================================================

/// Registry that namespaces several memoized callables over one shared
/// cache.
///
/// Each wrapped name gets its own prefixed view of the shared store, so
/// results of different callables never collide. Wrapping a name again
/// registers over the previous entry and reuses its namespace: the new
/// wrapper is always a single cache layer over the raw callable, never a
/// cache of a cache.
pub struct CachedGroup<S> {
    cache: Arc<S>,
    namespaces: HashMap<String, String>,
}

impl<S: KvStore> CachedGroup<S> {
    /// Creates a registry over a shared cache.
    pub fn new(cache: S) -> Self {
        Self {
            cache: Arc::new(cache),
            namespaces: HashMap::new(),
        }
    }

    /// Wraps a callable under a name, with the default `name.` prefix.
    pub fn wrap<F>(&mut self, name: impl Into<String>, func: F) -> CachedFn<PrefixedCache<Arc<S>>, F> {
        let name = name.into();
        let prefix = format!("{name}.");
        self.wrap_with(name, prefix, func)
    }

    /// Wraps a callable under a name with an explicit prefix.
    pub fn wrap_with<F>(
        &mut self,
        name: impl Into<String>,
        prefix: impl Into<String>,
        func: F,
    ) -> CachedFn<PrefixedCache<Arc<S>>, F> {
        let name = name.into();
        let prefix = match self.namespaces.get(&name) {
            // Re-wrapping reuses the registered namespace so earlier
            // results stay reachable and layers never stack.
            Some(existing) => existing.clone(),
            None => {
                let prefix = prefix.into();
                self.namespaces.insert(name, prefix.clone());
                prefix
            }
        };
        CachedFn::new(PrefixedCache::new(Arc::clone(&self.cache), prefix), func)
    }

    /// Whether a name has been wrapped.
    pub fn is_wrapped(&self, name: &str) -> bool {
        self.namespaces.contains_key(name)
    }

    /// Registered names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.namespaces.keys().map(String::as_str)
    }

    /// The namespace view of a wrapped callable, for inspection or
    /// maintenance. Fails for names that were never wrapped.
    pub fn view(&self, name: &str) -> Result<PrefixedCache<Arc<S>>> {
        let prefix = self.namespaces.get(name).ok_or_else(|| {
            Error::config(format!("cannot access missing wrapped target: {name}"))
        })?;
        Ok(PrefixedCache::new(Arc::clone(&self.cache), prefix.clone()))
    }

    /// The shared underlying cache.
    pub fn cache(&self) -> &Arc<S> {
        &self.cache
    }
}

// =============================================================================
// Tests
// =============================================================================
