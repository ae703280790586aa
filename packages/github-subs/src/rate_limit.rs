//! Minimum-spacing rate limiter.
//!
//! Wraps a governor limiter with a burst of one, so successive permits are at
//! least one interval apart across all callers. A zero interval disables the
//! limiter entirely; intervals are capped at [`MAX_INTERVAL`].

use governor::{Quota, RateLimiter};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tracing::debug;

/// Longest supported interval. governor cannot represent periods past ~584 years.
pub const MAX_INTERVAL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

type DefaultRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Shared limiter enforcing a minimum interval between checked actions.
///
/// The first check after construction (or after [`RateLimit::set_rate_limit`])
/// is never delayed.
#[derive(Default)]
pub struct RateLimit {
    interval: RwLock<Duration>,
    limiter: RwLock<Option<Arc<DefaultRateLimiter>>>,
}

impl RateLimit {
    /// Create an unlimited rate limiter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a limiter with the given minimum interval.
    pub fn with_interval(interval: Duration) -> Self {
        let limit = Self::new();
        limit.set_rate_limit(interval);
        limit
    }

    /// Set the minimum wait between checks. Zero means unlimited.
    pub fn set_rate_limit(&self, interval: Duration) {
        let interval = interval.min(MAX_INTERVAL);
        let limiter = Quota::with_period(interval).map(|quota| Arc::new(RateLimiter::direct(quota)));

        *self.interval.write().unwrap_or_else(PoisonError::into_inner) = interval;
        *self.limiter.write().unwrap_or_else(PoisonError::into_inner) = limiter;
        debug!(interval_ms = interval.as_millis() as u64, "Rate limit updated");
    }

    /// The configured minimum interval.
    pub fn interval(&self) -> Duration {
        *self.interval.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Wait until at least one interval has passed since the previous permit.
    pub async fn check_rate_limit(&self) {
        let limiter = self
            .limiter
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        if let Some(limiter) = limiter {
            limiter.until_ready().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn test_unlimited_does_not_wait() {
        let limit = RateLimit::new();

        let start = Instant::now();
        for _ in 0..50 {
            limit.check_rate_limit().await;
        }

        assert!(start.elapsed() < Duration::from_millis(100));
        assert_eq!(limit.interval(), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_back_to_back_checks_are_spaced() {
        let limit = RateLimit::with_interval(Duration::from_millis(100));

        let start = Instant::now();
        for _ in 0..4 {
            limit.check_rate_limit().await;
        }
        let elapsed = start.elapsed();

        // first is immediate, the remaining three wait
        assert!(elapsed >= Duration::from_millis(290), "Rate limiting not working: {:?}", elapsed);
    }

    #[tokio::test]
    async fn test_first_check_not_delayed() {
        let limit = RateLimit::with_interval(Duration::from_secs(5));

        let start = Instant::now();
        limit.check_rate_limit().await;

        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_huge_interval_is_capped() {
        let limit = RateLimit::with_interval(Duration::from_secs(u64::MAX));

        assert_eq!(limit.interval(), MAX_INTERVAL);

        let start = Instant::now();
        limit.check_rate_limit().await;
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_callers_share_budget() {
        let limit = Arc::new(RateLimit::with_interval(Duration::from_millis(100)));

        let start = Instant::now();
        let mut handles = Vec::new();
        for _ in 0..4 {
            let limit = Arc::clone(&limit);
            handles.push(tokio::spawn(async move { limit.check_rate_limit().await }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert!(start.elapsed() >= Duration::from_millis(290));
    }
}
