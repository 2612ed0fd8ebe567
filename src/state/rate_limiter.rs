//! Per-host minimum-delay rate limiter.
//!
//! Each host has its own async lock around the time of its last dispatch. The
//! lock is held while waiting, so requests to one host are serialized through
//! the limiter and spaced at least `min_delay` apart. Hosts never block each other.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tracing::trace;

type HostSlot = Arc<tokio::sync::Mutex<Option<Instant>>>;

/// Minimum-gap limiter keyed by host (the crawler passes the URL origin).
#[derive(Debug)]
pub struct RateLimiter {
    min_delay: Duration,
    hosts: Mutex<HashMap<String, HostSlot>>,
}

impl RateLimiter {
    /// Create a limiter; a zero delay disables throttling.
    pub fn new(min_delay: Duration) -> Self {
        Self {
            min_delay,
            hosts: Mutex::new(HashMap::new()),
        }
    }

    /// Wait until `host` may be contacted again, then record the dispatch.
    ///
    /// Returns how long the caller was made to sleep.
    pub async fn throttle(&self, host: &str) -> Duration {
        if self.min_delay.is_zero() {
            return Duration::ZERO;
        }

        let slot = self.slot(host);
        let mut last = slot.lock().await;

        let now = Instant::now();
        let waited = match *last {
            Some(previous) => {
                let elapsed = now.saturating_duration_since(previous);
                if elapsed < self.min_delay {
                    let wait = self.min_delay - elapsed;
                    trace!("Rate limiting {}: waiting {:?}", host, wait);
                    tokio::time::sleep(wait).await;
                    wait
                } else {
                    Duration::ZERO
                }
            }
            None => Duration::ZERO,
        };

        *last = Some(Instant::now());
        waited
    }

    fn slot(&self, host: &str) -> HostSlot {
        let mut hosts = self.hosts.lock().unwrap_or_else(|e| e.into_inner());
        Arc::clone(hosts.entry(host.to_string()).or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_zero_delay_is_noop() {
        let limiter = RateLimiter::new(Duration::ZERO);
        for _ in 0..5 {
            assert_eq!(limiter.throttle("http://a").await, Duration::ZERO);
        }
    }

    #[tokio::test]
    async fn test_first_request_does_not_wait() {
        let limiter = RateLimiter::new(Duration::from_millis(200));
        assert_eq!(limiter.throttle("http://a").await, Duration::ZERO);
    }

    #[tokio::test]
    async fn test_same_host_requests_are_spaced() {
        let delay = Duration::from_millis(80);
        let limiter = RateLimiter::new(delay);

        let start = Instant::now();
        limiter.throttle("http://a").await;
        limiter.throttle("http://a").await;
        limiter.throttle("http://a").await;

        assert!(start.elapsed() >= delay * 2);
    }

    #[tokio::test]
    async fn test_concurrent_same_host_dispatches_keep_gap() {
        let delay = Duration::from_millis(50);
        let limiter = Arc::new(RateLimiter::new(delay));
        let stamps = Arc::new(Mutex::new(Vec::new()));

        let mut handles = Vec::new();
        for _ in 0..4 {
            let limiter = Arc::clone(&limiter);
            let stamps = Arc::clone(&stamps);
            handles.push(tokio::spawn(async move {
                limiter.throttle("http://a").await;
                stamps.lock().unwrap().push(Instant::now());
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let mut stamps = stamps.lock().unwrap().clone();
        stamps.sort();
        for pair in stamps.windows(2) {
            // Stamps are taken just after release, allow a little scheduling slack
            assert!(pair[1] - pair[0] >= delay - Duration::from_millis(10));
        }
    }

    #[tokio::test]
    async fn test_different_hosts_do_not_block() {
        let limiter = RateLimiter::new(Duration::from_secs(5));
        limiter.throttle("http://a").await;

        let start = Instant::now();
        let waited = limiter.throttle("http://b").await;
        assert_eq!(waited, Duration::ZERO);
        assert!(start.elapsed() < Duration::from_secs(1));
    }
}
