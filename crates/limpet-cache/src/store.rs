//! Concurrent response store

use bytes::Bytes;
use dashmap::DashMap;
use http::HeaderMap;
use limpet_core::Encoding;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::trace;

/// Key for one cached response variant
///
/// The raw (uncompressed) response for a path and each of its compressed
/// variants are independent entries; no key aliases another.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    path: String,
    encoding: Option<Encoding>,
}

impl CacheKey {
    /// Key for the uncompressed canonical response of `path`
    pub fn raw(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            encoding: None,
        }
    }

    /// Key for the `encoding` variant of `path`
    pub fn encoded(path: impl Into<String>, encoding: Encoding) -> Self {
        Self {
            path: path.into(),
            encoding: Some(encoding),
        }
    }

    /// The path component of the key
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The encoding component of the key, `None` for the raw entry
    pub fn encoding(&self) -> Option<Encoding> {
        self.encoding
    }
}

/// Immutable snapshot of one rendered response
///
/// Once stored an entry is never mutated in place; deriving a compressed
/// variant produces a new entry under a new key.
#[derive(Debug, Clone)]
pub struct CachedResponse {
    /// Response payload
    pub body: Bytes,
    /// Response headers captured at creation time
    pub headers: HeaderMap,
    /// Creation timestamp, used by the eviction sweeper
    pub stored_at: Instant,
}

impl CachedResponse {
    /// Create a snapshot timestamped now
    pub fn new(body: Bytes, headers: HeaderMap) -> Self {
        Self {
            body,
            headers,
            stored_at: Instant::now(),
        }
    }

    /// Whether the entry is older than `max_age`
    pub fn is_expired(&self, max_age: Duration) -> bool {
        self.stored_at.elapsed() > max_age
    }
}

/// Concurrent in-memory response cache
///
/// Cloning is cheap and clones share the same underlying store.
#[derive(Debug, Clone, Default)]
pub struct ResponseCache {
    entries: Arc<DashMap<CacheKey, Arc<CachedResponse>>>,
}

impl ResponseCache {
    /// Create an empty cache with no background sweeper
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a response, unconditionally replacing any existing entry
    ///
    /// Under concurrent population of the same key the last writer wins;
    /// readers see either the old or the new entry, never a mix.
    pub fn insert(&self, key: CacheKey, response: CachedResponse) {
        trace!(path = key.path(), encoding = ?key.encoding(), size = response.body.len(), "cache store");
        self.entries.insert(key, Arc::new(response));
    }

    /// Look up a response by key
    pub fn get(&self, key: &CacheKey) -> Option<Arc<CachedResponse>> {
        let entry = self.entries.get(key).map(|e| Arc::clone(e.value()));
        trace!(path = key.path(), encoding = ?key.encoding(), hit = entry.is_some(), "cache lookup");
        entry
    }

    /// Remove the raw entry and every encoded variant of `path`
    pub fn remove_path(&self, path: &str) {
        self.entries.remove(&CacheKey::raw(path));
        for encoding in Encoding::ALL {
            self.entries.remove(&CacheKey::encoded(path, encoding));
        }
    }

    /// Remove every entry
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Number of entries currently stored
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn retain_younger_than(&self, max_age: Duration) -> usize {
        let mut removed = 0;
        self.entries.retain(|_, entry| {
            if entry.is_expired(max_age) {
                removed += 1;
                false
            } else {
                true
            }
        });
        removed
    }
}
