//! Sliding-window rate limiter for NCBI API compliance
//!
//! NCBI E-utilities rate limits:
//! - 3 requests per second without API key
//! - 10 requests per second with API key
//! - Violations can result in IP blocking
//!
//! The limiter keeps a log of request timestamps. The admission check prunes
//! entries that are no longer strictly inside the trailing one-second window
//! and reports the limit as exceeded when more than `ceiling` entries remain.
//! [`RateLimiter::acquire`] waits until the check passes and logs the request
//! under the same lock, so concurrent callers cannot pass on one free slot.
//! [`RateLimiter::record`] logs a request made without `acquire`.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tracing::{debug, instrument};

use crate::time::{Clock, SystemClock};

const WINDOW: Duration = Duration::from_secs(1);

/// Rate limiter shared by every request a client makes
///
/// Cloning is cheap; clones share one request log.
#[derive(Clone, Debug)]
pub struct RateLimiter {
    log: Arc<Mutex<RequestLog>>,
    ceiling: usize,
    window: Duration,
    clock: Arc<dyn Clock>,
}

#[derive(Debug, Default)]
struct RequestLog {
    timestamps: VecDeque<Instant>,
}

impl RequestLog {
    /// Drop timestamps that are not strictly newer than `now - window`
    fn prune(&mut self, now: Instant, window: Duration) {
        while let Some(&oldest) = self.timestamps.front() {
            if now.saturating_duration_since(oldest) < window {
                break;
            }
            self.timestamps.pop_front();
        }
    }
}

impl RateLimiter {
    /// Create a limiter admitting `ceiling` requests per trailing second
    ///
    /// # Example
    ///
    /// ```
    /// use pubmed_harvest::RateLimiter;
    ///
    /// let limiter = RateLimiter::new(3);
    /// assert_eq!(limiter.ceiling(), 3);
    /// assert!(!limiter.is_exceeded());
    /// ```
    pub fn new(ceiling: usize) -> Self {
        Self::with_clock(ceiling, Arc::new(SystemClock))
    }

    /// Create a limiter reading time from the given clock
    pub fn with_clock(ceiling: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            log: Arc::new(Mutex::new(RequestLog::default())),
            ceiling,
            window: WINDOW,
            clock,
        }
    }

    /// Create rate limiter for NCBI API without API key (3 requests/second)
    pub fn ncbi_default() -> Self {
        Self::new(3)
    }

    /// Create rate limiter for NCBI API with API key (10 requests/second)
    pub fn ncbi_with_key() -> Self {
        Self::new(10)
    }

    pub fn ceiling(&self) -> usize {
        self.ceiling
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    fn lock_log(&self) -> MutexGuard<'_, RequestLog> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Admission check: prune the log, then report whether the number of
    /// requests in the trailing window is strictly greater than the ceiling
    pub fn is_exceeded(&self) -> bool {
        self.recorded_in_window() > self.ceiling
    }

    /// Number of requests recorded in the trailing window (prunes first)
    pub fn recorded_in_window(&self) -> usize {
        let now = self.clock.now();
        let mut log = self.lock_log();
        log.prune(now, self.window);
        log.timestamps.len()
    }

    /// Wait until the admission check passes, then log the request
    ///
    /// Instead of polling, this sleeps until the timestamp whose expiry brings
    /// the log back to `ceiling` entries leaves the window, then re-checks.
    /// The admitted request is counted from the moment `acquire` returns.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use pubmed_harvest::RateLimiter;
    ///
    /// #[tokio::main]
    /// async fn main() {
    ///     let limiter = RateLimiter::ncbi_default();
    ///
    ///     for i in 0..5 {
    ///         limiter.acquire().await;
    ///         println!("Making API call {}", i + 1);
    ///     }
    /// }
    /// ```
    #[instrument(skip(self), fields(ceiling = self.ceiling))]
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let now = self.clock.now();
                let mut log = self.lock_log();
                log.prune(now, self.window);

                let recorded = log.timestamps.len();
                if recorded <= self.ceiling {
                    log.timestamps.push_back(now);
                    debug!(recorded = recorded + 1, "Request admitted");
                    return;
                }

                // The log shrinks to `ceiling` entries once this one expires
                let blocking = log.timestamps[recorded - self.ceiling - 1];
                (blocking + self.window).saturating_duration_since(now)
            };

            debug!(
                wait_duration_ms = wait.as_millis() as u64,
                "Rate limit reached, waiting for window to slide"
            );
            self.clock.sleep(wait).await;
        }
    }

    /// Log a request that bypassed [`RateLimiter::acquire`]
    pub fn record(&self) {
        let now = self.clock.now();
        self.lock_log().timestamps.push_back(now);
    }
}
