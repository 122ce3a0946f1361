use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Paces outbound requests to a single upstream host.
///
/// `wait()` blocks the caller until at least `min_interval` has elapsed since
/// the previous permitted call. All callers share one critical section, so
/// requests are serialized and monotonically paced; ordering between
/// concurrent callers is whatever the mutex hands out.
pub struct RateLimiter {
    min_interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        RateLimiter {
            min_interval,
            last_request: Mutex::new(None),
        }
    }

    /// Block until the minimum interval has passed, then stamp the clock.
    ///
    /// The lock is held across the sleep on purpose: the next caller must not
    /// start its own countdown until this one's slot is consumed.
    pub async fn wait(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }
}
