//! Admission control for request pipelines.
//!
//! Three limiter flavors share one capability set: a token bucket
//! (burst plus steady rate), a sliding window (hard ceiling over a
//! wall-clock window), and a composite that admits only when every
//! constituent limiter admits.
//!
//! Limiters never fail; rejection is the signal. The blocking variant
//! takes an explicit cancellation handle instead of relying on any
//! ambient deadline state.

mod composite;
mod sliding_window;
mod token_bucket;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

pub use composite::CompositeLimiter;
pub use sliding_window::SlidingWindow;
pub use token_bucket::TokenBucket;

/// Common capability set for admission limiters.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Non-blocking admission check; returns immediately.
    fn try_allow(&self) -> bool;

    /// Block until admitted or until `cancel` fires.
    ///
    /// Returns `false` iff the handle was cancelled before admission.
    async fn allow(&self, cancel: &CancellationToken) -> bool;
}
