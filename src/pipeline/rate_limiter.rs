use std::time::Instant;
use tokio::sync::Mutex;
use tokio::time::{sleep, Duration};

/// Token bucket paced in requests per minute.
///
/// Burst capacity is a single token, so the externally observed spacing
/// between calls never drops below the configured rate. A rate of 0 means
/// unlimited.
#[derive(Debug)]
pub struct RateLimiter {
    bucket: Mutex<(f64, Instant)>,
    refill_per_sec: f64,
}

impl RateLimiter {
    pub fn new(requests_per_min: u64) -> Self {
        Self {
            bucket: Mutex::new((1.0, Instant::now())),
            refill_per_sec: requests_per_min as f64 / 60.0,
        }
    }

    /// Take one token, sleeping until the bucket has refilled enough.
    pub async fn acquire(&self) {
        if self.refill_per_sec <= 0.0 {
            return;
        }
        loop {
            let mut guard = self.bucket.lock().await;
            let (ref mut tokens, ref mut last_refill) = *guard;
            let now = Instant::now();
            let elapsed = now.duration_since(*last_refill).as_secs_f64();
            *tokens = (*tokens + elapsed * self.refill_per_sec).min(1.0);
            *last_refill = now;
            if *tokens >= 1.0 {
                *tokens -= 1.0;
                return;
            }
            let wait_secs = (1.0 - *tokens) / self.refill_per_sec;
            drop(guard);
            sleep(Duration::from_secs_f64(wait_secs.max(0.001))).await;
        }
    }
}
