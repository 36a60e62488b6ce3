//! Time source used by the rate limiter
//!
//! The limiter never calls `Instant::now()` or `tokio::time::sleep` directly;
//! it goes through a [`Clock`]. [`SystemClock`] is the real thing,
//! [`ManualClock`] is a virtual clock whose `sleep` advances time instantly,
//! which lets tests observe the sliding window deterministically.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use futures_util::future::{self, BoxFuture, FutureExt};

/// Source of "now" and of async delays
pub trait Clock: Send + Sync + fmt::Debug {
    /// Current instant
    fn now(&self) -> Instant;

    /// Suspend the caller for `duration`
    fn sleep(&self, duration: Duration) -> BoxFuture<'_, ()>;
}

/// Wall clock backed by tokio's timer
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) -> BoxFuture<'_, ()> {
        if duration.is_zero() {
            return future::ready(()).boxed();
        }
        tokio::time::sleep(duration).boxed()
    }
}

/// Virtual clock that only moves when told to
///
/// Clones share the same virtual time.
///
/// # Example
///
/// ```
/// use pubmed_harvest::time::{Clock, ManualClock};
/// use std::time::Duration;
///
/// let clock = ManualClock::new();
/// let start = clock.now();
/// clock.advance(Duration::from_millis(250));
/// assert_eq!(clock.now() - start, Duration::from_millis(250));
/// ```
#[derive(Debug, Clone)]
pub struct ManualClock {
    origin: Instant,
    offset: Arc<Mutex<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Arc::new(Mutex::new(Duration::ZERO)),
        }
    }

    /// Move virtual time forward
    pub fn advance(&self, duration: Duration) {
        let mut offset = self.offset.lock().unwrap_or_else(PoisonError::into_inner);
        *offset += duration;
    }

    /// Total virtual time elapsed since creation
    pub fn elapsed(&self) -> Duration {
        *self.offset.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed()
    }

    fn sleep(&self, duration: Duration) -> BoxFuture<'_, ()> {
        self.advance(duration);
        future::ready(()).boxed()
    }
}
