use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::RateLimiter;

struct BucketState {
    tokens: f64,
    last_refill: Instant,
}

/// Token bucket limiter: `capacity` bounds the burst, `rate` the steady
/// admission rate in tokens per second.
///
/// The bucket starts full. Refill happens on access: elapsed time times
/// rate, clamped to capacity.
pub struct TokenBucket {
    rate: f64,
    capacity: f64,
    state: Mutex<BucketState>,
}

impl TokenBucket {
    /// Create a bucket with `rate` tokens per second and room for
    /// `capacity` tokens.
    ///
    /// # Panics
    ///
    /// Panics if `rate` is not strictly positive or `capacity` is zero.
    pub fn new(rate: f64, capacity: u64) -> Self {
        assert!(rate > 0.0, "token bucket rate must be positive");
        assert!(capacity >= 1, "token bucket capacity must be at least 1");
        Self {
            rate,
            capacity: capacity as f64,
            state: Mutex::new(BucketState {
                tokens: capacity as f64,
                last_refill: Instant::now(),
            }),
        }
    }

    /// Sleep bound between retries: the time one token takes to accrue,
    /// floored at one millisecond so very high rates do not busy-spin.
    fn retry_interval(&self) -> Duration {
        Duration::from_secs_f64((1.0 / self.rate).max(0.001))
    }
}

#[async_trait]
impl RateLimiter for TokenBucket {
    fn try_allow(&self) -> bool {
        let mut state = self.state.lock().unwrap();
        let now = Instant::now();
        let elapsed = now.duration_since(state.last_refill).as_secs_f64();
        state.last_refill = now;
        state.tokens = (state.tokens + elapsed * self.rate).min(self.capacity);

        if state.tokens >= 1.0 {
            state.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    async fn allow(&self, cancel: &CancellationToken) -> bool {
        loop {
            if self.try_allow() {
                return true;
            }
            tokio::select! {
                _ = cancel.cancelled() => {
                    trace!("token bucket wait cancelled");
                    return false;
                }
                _ = tokio::time::sleep(self.retry_interval()) => {}
            }
        }
    }
}
