//! Global minimum-interval gate for outbound requests

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};

/// Spaces outbound requests at least `min_interval` apart
///
/// One limiter is shared by every operation of a gateway. The lock is held
/// across the wait and the stamp, so concurrent callers queue up behind each
/// other instead of racing on a stale timestamp.
#[derive(Debug)]
pub struct RateLimiter {
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            last_request: Mutex::new(None),
            min_interval,
        }
    }

    /// Waits until a request may be issued and stamps it as issued
    ///
    /// Returns how long the caller was held back.
    pub async fn acquire(&self) -> Duration {
        let mut last = self.last_request.lock().await;
        let mut waited = Duration::ZERO;

        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                waited = self.min_interval - elapsed;
                tracing::debug!(wait_ms = waited.as_millis() as u64, "Rate limiting outbound request");
                sleep(waited).await;
            }
        }

        *last = Some(Instant::now());
        waited
    }

    /// Instant of the most recently issued request
    pub async fn last_request_at(&self) -> Option<Instant> {
        *self.last_request.lock().await
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }
}
