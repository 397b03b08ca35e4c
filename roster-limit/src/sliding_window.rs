use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::RateLimiter;

/// Sliding window limiter: at most `max_requests` admissions in any
/// rolling interval of `window` length.
///
/// Admission timestamps are kept in arrival order; each check prunes the
/// ones that have slid out of the window before counting.
pub struct SlidingWindow {
    max_requests: usize,
    window: Duration,
    admitted: Mutex<VecDeque<Instant>>,
}

impl SlidingWindow {
    /// # Panics
    ///
    /// Panics if `max_requests` is zero or `window` is zero.
    pub fn new(max_requests: usize, window: Duration) -> Self {
        assert!(max_requests >= 1, "sliding window needs max_requests >= 1");
        assert!(!window.is_zero(), "sliding window duration must be non-zero");
        Self {
            max_requests,
            window,
            admitted: Mutex::new(VecDeque::with_capacity(max_requests)),
        }
    }

    /// Drop timestamps at or before `now - window`.
    fn prune(admitted: &mut VecDeque<Instant>, window: Duration, now: Instant) {
        while let Some(&oldest) = admitted.front() {
            if now.duration_since(oldest) >= window {
                admitted.pop_front();
            } else {
                break;
            }
        }
    }

    /// How long until the oldest admission slides out, plus a small margin.
    fn retry_interval(&self) -> Duration {
        let admitted = self.admitted.lock().unwrap();
        let wait = match admitted.front() {
            Some(&oldest) => (oldest + self.window).saturating_duration_since(Instant::now()),
            None => Duration::ZERO,
        };
        wait + Duration::from_millis(1)
    }
}

#[async_trait]
impl RateLimiter for SlidingWindow {
    fn try_allow(&self) -> bool {
        let mut admitted = self.admitted.lock().unwrap();
        let now = Instant::now();
        Self::prune(&mut admitted, self.window, now);

        if admitted.len() < self.max_requests {
            admitted.push_back(now);
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
                    trace!("sliding window wait cancelled");
                    return false;
                }
                _ = tokio::time::sleep(self.retry_interval()) => {}
            }
        }
    }
}
