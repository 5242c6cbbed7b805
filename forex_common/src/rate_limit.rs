//! Minimum-interval limiter for outbound calls at the network boundary.
//!
//! The limiter never queues or retries: a call that arrives before the interval has
//! elapsed since the last admitted call fails immediately with `RateLimited`.
//! Rejected calls do not move the window.
//!
//! Time is measured with `std::time::Instant`, so wall-clock changes do not affect it.
//! The limiter is not synchronized; wrap it in a `Mutex` when sharing across threads.

use std::time::{Duration, Instant};

use crate::error::FeedError;
use crate::net::MIN_REQUEST_INTERVAL_MS;

/// Tracks the last admitted call and enforces `min_interval` between calls.
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_admitted: Option<Instant>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(Duration::from_millis(MIN_REQUEST_INTERVAL_MS))
    }
}

impl RateLimiter {
    /// Create a limiter with the given minimum interval.
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_admitted: None,
        }
    }

    /// Configured minimum interval.
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Admit or reject a call happening now.
    pub fn check(&mut self) -> Result<(), FeedError> {
        self.check_at(Instant::now())
    }

    /// Admit or reject a call happening at `now`.
    pub fn check_at(&mut self, now: Instant) -> Result<(), FeedError> {
        if let Some(last) = self.last_admitted {
            let elapsed = now.saturating_duration_since(last);
            if elapsed < self.min_interval {
                let wait = self.min_interval - elapsed;
                return Err(FeedError::RateLimited(format!(
                    "Rate limit exceeded. Please wait {} ms before making another request.",
                    wait.as_millis()
                )));
            }
        }
        self.last_admitted = Some(now);
        Ok(())
    }
}
