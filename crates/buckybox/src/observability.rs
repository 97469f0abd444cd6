//! Centralized observability utilities for structured logging
//!
//! Every dispatched query is logged through this layer so field names stay
//! consistent: `method`, `path`, `status`, `elapsed_ms`, `cache`.

use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::cache::CacheKey;

/// HTTP request metadata for structured logging
#[derive(Debug, Clone)]
pub struct RequestMetadata {
    /// HTTP method (GET, POST, etc.)
    pub method: String,
    /// Request path
    pub path: String,
    /// Request body size in bytes (optional)
    pub body_size: Option<usize>,
}

impl RequestMetadata {
    /// Create new request metadata
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            body_size: None,
        }
    }

    /// Set the request body size
    pub fn with_body_size(mut self, size: Option<usize>) -> Self {
        self.body_size = size;
        self
    }

    /// Log request being sent
    pub fn log_request(&self) {
        debug!(
            method = %self.method,
            path = %self.path,
            body_size = self.body_size,
            "Sending HTTP request"
        );
    }
}

/// HTTP response metadata for structured logging
#[derive(Debug, Clone)]
pub struct ResponseMetadata {
    /// HTTP status code
    pub status: u16,
    /// Response body size in bytes
    pub body_size: usize,
    /// Time elapsed for the request
    pub elapsed: Duration,
}

impl ResponseMetadata {
    /// Create new response metadata
    pub fn new(status: u16, body_size: usize, elapsed: Duration) -> Self {
        Self {
            status,
            body_size,
            elapsed,
        }
    }

    /// Log successful response
    pub fn log_success(&self, request: &RequestMetadata) {
        info!(
            method = %request.method,
            path = %request.path,
            status = self.status,
            elapsed_ms = self.elapsed.as_millis(),
            body_size = self.body_size,
            "HTTP request succeeded"
        );
    }

    /// Log failed response
    pub fn log_error(&self, request: &RequestMetadata, error: &str) {
        warn!(
            method = %request.method,
            path = %request.path,
            status = self.status,
            elapsed_ms = self.elapsed.as_millis(),
            error = %error,
            "HTTP request failed"
        );
    }
}

/// Timer for measuring request duration
pub struct RequestTimer {
    start: Instant,
}

impl RequestTimer {
    /// Start a new timer
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get elapsed duration
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

/// Log a cache hit
pub fn log_cache_hit(key: &CacheKey) {
    debug!(path = %key.path(), query = %key.query(), cache = "hit", "Serving cached response");
}

/// Log a cache miss (absent or expired entry)
pub fn log_cache_miss(key: &CacheKey) {
    debug!(path = %key.path(), query = %key.query(), cache = "miss", "No fresh cached response");
}

/// Log a cache store
pub fn log_cache_store(key: &CacheKey) {
    debug!(path = %key.path(), query = %key.query(), cache = "store", "Cached response");
}

/// Log a cache flush
pub fn log_cache_flush(entries: usize) {
    debug!(entries, cache = "flush", "Flushed response cache");
}

/// Install a global `fmt` subscriber filtered by `RUST_LOG`.
///
/// Defaults to `buckybox=info` when `RUST_LOG` is unset. Calling this more
/// than once is harmless; later calls leave the first subscriber in place.
#[cfg(feature = "trace")]
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("buckybox=info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
