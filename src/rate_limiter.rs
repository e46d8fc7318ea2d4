//! Rate limiter with adaptive backoff.
//!
//! MusicBrainz allows roughly one request per second per client; going
//! faster earns 503s.  The limiter enforces a minimum interval between
//! requests, doubles the interval after a reported failure, and halves it
//! back toward the base after enough consecutive successes.

use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

/// Enforces a minimum interval between requests with adaptive backoff.
pub struct RateLimiter {
    name: &'static str,
    last_request: Option<Instant>,
    current_interval: Duration,
    base_interval: Duration,
    max_interval: Duration,
    success_count: u32,
    successes_to_reduce: u32,
}

impl RateLimiter {
    /// Create a new rate limiter.
    ///
    /// * `name` — label for log events (e.g. "musicbrainz")
    /// * `base_interval` — minimum time between requests
    /// * `max_interval` — upper bound after repeated failures
    /// * `successes_to_reduce` — consecutive successes before halving the
    ///   interval (0 disables adaptive reduction)
    pub fn new(
        name: &'static str,
        base_interval: Duration,
        max_interval: Duration,
        successes_to_reduce: u32,
    ) -> Self {
        RateLimiter {
            name,
            last_request: None,
            current_interval: base_interval,
            base_interval,
            max_interval,
            success_count: 0,
            successes_to_reduce,
        }
    }

    /// Convenience: base interval in milliseconds, max 16× base, reduce
    /// after 10 consecutive successes.
    pub fn from_millis(name: &'static str, millis: u64) -> Self {
        let base = Duration::from_millis(millis);
        Self::new(name, base, base * 16, 10)
    }

    /// Wait until the current interval since the last request has elapsed.
    /// Must be called *before* making a request.
    pub async fn acquire(&mut self) {
        if let Some(last) = self.last_request {
            let elapsed = last.elapsed();
            if elapsed < self.current_interval {
                let wait = self.current_interval - elapsed;
                debug!(
                    limiter = self.name,
                    wait_ms = wait.as_millis() as u64,
                    "rate limiting"
                );
                tokio::time::sleep(wait).await;
            }
        }
        self.last_request = Some(Instant::now());
    }

    /// Report a successful request.  After enough consecutive successes the
    /// interval is halved (down to the base).
    pub fn report_success(&mut self) {
        if self.successes_to_reduce == 0 {
            return;
        }

        self.success_count += 1;

        if self.success_count >= self.successes_to_reduce
            && self.current_interval > self.base_interval
        {
            let halved = self.current_interval / 2;
            self.current_interval = halved.max(self.base_interval);
            debug!(
                limiter = self.name,
                interval_ms = self.current_interval.as_millis() as u64,
                successes = self.success_count,
                "rate limit interval reduced"
            );
            self.success_count = 0;
        }
    }

    /// Report a failed request.  Doubles the interval (up to the max).
    pub fn report_failure(&mut self) {
        self.current_interval = (self.current_interval * 2).min(self.max_interval);
        debug!(
            limiter = self.name,
            interval_ms = self.current_interval.as_millis() as u64,
            "rate limit interval increased"
        );
        self.success_count = 0;
    }

    #[cfg(test)]
    fn current_interval(&self) -> Duration {
        self.current_interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failures_double_up_to_max() {
        let mut limiter = RateLimiter::from_millis("test", 1000);
        assert_eq!(limiter.current_interval(), Duration::from_millis(1000));

        limiter.report_failure();
        assert_eq!(limiter.current_interval(), Duration::from_millis(2000));

        for _ in 0..10 {
            limiter.report_failure();
        }
        assert_eq!(limiter.current_interval(), Duration::from_millis(16000));
    }

    #[test]
    fn successes_halve_back_to_base() {
        let mut limiter = RateLimiter::from_millis("test", 1000);
        limiter.report_failure();
        limiter.report_failure();
        assert_eq!(limiter.current_interval(), Duration::from_millis(4000));

        for _ in 0..10 {
            limiter.report_success();
        }
        assert_eq!(limiter.current_interval(), Duration::from_millis(2000));

        for _ in 0..10 {
            limiter.report_success();
        }
        assert_eq!(limiter.current_interval(), Duration::from_millis(1000));

        // never drops below the base
        for _ in 0..20 {
            limiter.report_success();
        }
        assert_eq!(limiter.current_interval(), Duration::from_millis(1000));
    }

    #[test]
    fn failure_resets_success_streak() {
        let mut limiter = RateLimiter::from_millis("test", 1000);
        limiter.report_failure();
        limiter.report_failure();

        for _ in 0..9 {
            limiter.report_success();
        }
        limiter.report_failure();
        assert_eq!(limiter.current_interval(), Duration::from_millis(8000));

        // the streak starts over, nine more successes change nothing
        for _ in 0..9 {
            limiter.report_success();
        }
        assert_eq!(limiter.current_interval(), Duration::from_millis(8000));
    }

    #[tokio::test]
    async fn first_acquire_does_not_wait() {
        let mut limiter = RateLimiter::from_millis("test", 60_000);
        let start = std::time::Instant::now();
        limiter.acquire().await;
        assert!(start.elapsed() < Duration::from_secs(1));
    }
}
