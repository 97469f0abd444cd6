//! Short-lived cache for GET responses
//!
//! Each client owns one [`ResponseCache`]. Entries live for
//! [`CACHE_TTL_SECONDS`] and are keyed by a [`CacheKey`] derived from the
//! client's headers, the request path and the canonical query string.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use http::HeaderMap;
use sha2::{Digest, Sha256};

use crate::clock::{Clock, SystemClock};
use crate::value::Value;

/// How long a cached response stays fresh.
pub const CACHE_TTL_SECONDS: i64 = 60;

/// Identifies one cacheable GET request.
///
/// Two requests share a key exactly when their header sets, paths and
/// canonical query strings are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    header_digest: String,
    path: String,
    query: String,
}

impl CacheKey {
    /// Build a key from its three components.
    pub fn new(
        header_digest: impl Into<String>,
        path: impl Into<String>,
        query: impl Into<String>,
    ) -> Self {
        Self {
            header_digest: header_digest.into(),
            path: path.into(),
            query: query.into(),
        }
    }

    /// Digest of the headers the request was sent with.
    pub fn header_digest(&self) -> &str {
        &self.header_digest
    }

    /// Request path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Canonical query string.
    pub fn query(&self) -> &str {
        &self.query
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}?{}", self.header_digest, self.path, self.query)
    }
}

/// Stable digest of a header set.
///
/// Lines of `name:value` are sorted before hashing, so insertion order does
/// not matter. The result is a hex-encoded SHA-256.
pub fn header_digest(headers: &HeaderMap) -> String {
    let mut lines: Vec<Vec<u8>> = headers
        .iter()
        .map(|(name, value)| {
            let mut line = name.as_str().as_bytes().to_vec();
            line.push(b':');
            line.extend_from_slice(value.as_bytes());
            line
        })
        .collect();
    lines.sort_unstable();

    let mut hasher = Sha256::new();
    for line in &lines {
        hasher.update(line);
        hasher.update(b"\n");
    }
    hex::encode(hasher.finalize())
}

/// A cached response value and when it was produced.
#[derive(Debug, Clone)]
pub struct CachedEntry {
    value: Arc<Value>,
    cached_at: i64,
    generation: u64,
}

impl CachedEntry {
    /// Stamp `value` with `cached_at` (epoch seconds).
    pub fn new(value: Arc<Value>, cached_at: i64) -> Self {
        Self {
            value,
            cached_at,
            generation: 0,
        }
    }

    /// The cached value.
    pub fn value(&self) -> &Arc<Value> {
        &self.value
    }

    /// When the entry was stored, in epoch seconds.
    pub fn cached_at(&self) -> i64 {
        self.cached_at
    }

    /// Stale once more than [`CACHE_TTL_SECONDS`] have passed.
    pub fn is_expired_at(&self, now: i64) -> bool {
        now - self.cached_at > CACHE_TTL_SECONDS
    }
}

/// Concurrent map of fresh GET responses.
///
/// Every [`flush`](ResponseCache::flush) starts a new generation. Entries
/// only count for the generation they were stored in, so a request that
/// started before a flush cannot repopulate the cache after it.
pub struct ResponseCache {
    entries: DashMap<CacheKey, CachedEntry>,
    generation: AtomicU64,
    clock: Arc<dyn Clock>,
}

impl ResponseCache {
    /// Empty cache reading the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Empty cache reading `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            generation: AtomicU64::new(0),
            clock,
        }
    }

    /// The fresh value for `key`, if any.
    ///
    /// Expired entries are reported as absent; the next [`put`](Self::put)
    /// for the key replaces them.
    pub fn get(&self, key: &CacheKey) -> Option<Arc<Value>> {
        let now = self.clock.epoch_seconds();
        let entry = self.entries.get(key)?;
        let cached = entry.value();
        if cached.generation != self.generation() {
            None
        } else if cached.is_expired_at(now) {
            tracing::trace!(key = %key, age = now - cached.cached_at(), "cache entry expired");
            None
        } else {
            Some(Arc::clone(cached.value()))
        }
    }

    /// Current flush generation.
    ///
    /// Read it before starting the request whose result is passed to
    /// [`put_if_generation`](Self::put_if_generation).
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Store `value` under `key`, replacing any previous entry.
    pub fn put(&self, key: CacheKey, value: Arc<Value>) {
        self.put_if_generation(key, value, self.generation());
    }

    /// Store `value` only if no flush happened since `generation` was read.
    ///
    /// Returns whether the value was stored.
    pub fn put_if_generation(&self, key: CacheKey, value: Arc<Value>, generation: u64) -> bool {
        if generation != self.generation() {
            return false;
        }
        let mut entry = CachedEntry::new(value, self.clock.epoch_seconds());
        entry.generation = generation;
        self.entries.insert(key, entry);
        true
    }

    /// Drop every entry and start a new generation.
    pub fn flush(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.entries.clear();
    }

    /// Number of stored entries, fresh or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ResponseCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseCache")
            .field("entries", &self.entries.len())
            .finish_non_exhaustive()
    }
}
