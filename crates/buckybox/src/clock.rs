//! Wall-clock abstraction for cache expiry
//!
//! The response cache stamps entries with epoch seconds. Production code
//! reads [`SystemClock`]; tests drive a [`ManualClock`] forward instead of
//! sleeping through the TTL.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

/// Source of the current time in seconds since the UNIX epoch (UTC).
pub trait Clock: Send + Sync + 'static {
    /// Current time, in whole seconds since the epoch.
    fn epoch_seconds(&self) -> i64;
}

/// Real system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn epoch_seconds(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

impl<T: Clock> Clock for Arc<T> {
    fn epoch_seconds(&self) -> i64 {
        (**self).epoch_seconds()
    }
}

/// Clock that only moves when told to.
///
/// Clones share the same time, so a test can keep one handle and give
/// another to the client.
///
/// # Example
///
/// ```
/// use buckybox::clock::{Clock, ManualClock};
///
/// let clock = ManualClock::new(1_000);
/// clock.advance(61);
/// assert_eq!(clock.epoch_seconds(), 1_061);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicI64>,
}

impl ManualClock {
    /// Start at `epoch_seconds`.
    pub fn new(epoch_seconds: i64) -> Self {
        Self {
            now: Arc::new(AtomicI64::new(epoch_seconds)),
        }
    }

    /// Move forward by `seconds`.
    pub fn advance(&self, seconds: i64) {
        self.now.fetch_add(seconds, Ordering::SeqCst);
    }

    /// Jump to an absolute time.
    pub fn set(&self, epoch_seconds: i64) {
        self.now.store(epoch_seconds, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn epoch_seconds(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}
