use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::RateLimiter;

/// Conjunction of limiters: a request is admitted iff every constituent
/// limiter admits it, checked in construction order.
///
/// A token consumed from an earlier limiter is not returned when a later
/// one rejects. Best-effort rollback would make the steady-state rate
/// hard to reason about, so the partial consumption is accepted.
pub struct CompositeLimiter {
    limiters: Vec<Arc<dyn RateLimiter>>,
}

impl CompositeLimiter {
    pub fn new(limiters: Vec<Arc<dyn RateLimiter>>) -> Self {
        Self { limiters }
    }
}

#[async_trait]
impl RateLimiter for CompositeLimiter {
    fn try_allow(&self) -> bool {
        // Short-circuits on the first rejection.
        self.limiters.iter().all(|limiter| limiter.try_allow())
    }

    async fn allow(&self, cancel: &CancellationToken) -> bool {
        for limiter in &self.limiters {
            if !limiter.allow(cancel).await {
                return false;
            }
        }
        true
    }
}
