//! Request metrics: counters, concurrency gauge, rolling latency samples
//! with percentile estimation, and a periodic resource sampler.
//!
//! Counters use atomic read-modify-write and are strictly monotonic under
//! concurrency. The latency ring sits behind its own lock; resource
//! samples are written by a single sampler task and read atomically.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Retained latency samples; the oldest is evicted first.
const LATENCY_RING_CAPACITY: usize = 10_000;

/// How often the resource sampler runs.
const SAMPLE_INTERVAL: Duration = Duration::from_secs(1);

/// Completion outcome reported through a [`RequestTicket`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    Success,
    Failure,
}

/// Bounded FIFO of request durations with percentile estimation.
struct LatencyRing {
    samples: std::collections::VecDeque<Duration>,
}

impl LatencyRing {
    fn new() -> Self {
        Self {
            samples: std::collections::VecDeque::with_capacity(1024),
        }
    }

    fn push(&mut self, sample: Duration) {
        if self.samples.len() == LATENCY_RING_CAPACITY {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    /// The p-th percentile over a sorted stable copy; zero when empty.
    fn percentile(&self, p: f64) -> Duration {
        if self.samples.is_empty() {
            return Duration::ZERO;
        }
        let mut sorted: Vec<Duration> = self.samples.iter().copied().collect();
        sorted.sort_unstable();
        let index = ((sorted.len() - 1) as f64 * p / 100.0) as usize;
        sorted[index]
    }

    fn average(&self) -> Duration {
        if self.samples.is_empty() {
            return Duration::ZERO;
        }
        let total: Duration = self.samples.iter().sum();
        total / self.samples.len() as u32
    }
}

struct Inner {
    start_instant: Instant,
    started_at: DateTime<Utc>,
    requests_total: AtomicU64,
    requests_succeeded: AtomicU64,
    requests_failed: AtomicU64,
    current_concurrent: AtomicI64,
    max_concurrent: i64,
    latencies: Mutex<LatencyRing>,
    memory_bytes: AtomicU64,
    cpu_fraction_bits: AtomicU64,
    cancel: CancellationToken,
    sampler: Mutex<Option<JoinHandle<()>>>,
}

/// Process-wide metrics collector; cheap to clone and share.
#[derive(Clone)]
pub struct MetricsCollector {
    inner: Arc<Inner>,
}

/// Per-request measurement handle returned by
/// [`MetricsCollector::record_request`].
///
/// Completion is one-shot: `complete` consumes the ticket, and dropping an
/// uncompleted ticket records a failure, so the concurrency gauge is
/// decremented exactly once per request no matter how the request ends.
pub struct RequestTicket {
    inner: Arc<Inner>,
    start: Instant,
    completed: bool,
}

impl RequestTicket {
    /// Time elapsed since the request was admitted into measurement.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Record the request outcome and its latency sample.
    pub fn complete(mut self, outcome: RequestOutcome) {
        self.finish(outcome);
    }

    fn finish(&mut self, outcome: RequestOutcome) {
        if self.completed {
            return;
        }
        self.completed = true;

        let elapsed = self.start.elapsed();
        self.inner.latencies.lock().unwrap().push(elapsed);
        self.inner.current_concurrent.fetch_sub(1, Ordering::Relaxed);
        match outcome {
            RequestOutcome::Success => {
                self.inner.requests_succeeded.fetch_add(1, Ordering::Relaxed);
            }
            RequestOutcome::Failure => {
                self.inner.requests_failed.fetch_add(1, Ordering::Relaxed);
            }
        }
    }
}

impl Drop for RequestTicket {
    fn drop(&mut self) {
        self.finish(RequestOutcome::Failure);
    }
}

/// Point-in-time view of every collected metric.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub started_at: DateTime<Utc>,
    #[serde(with = "humantime_serde")]
    pub uptime: Duration,
    pub requests_total: u64,
    pub requests_succeeded: u64,
    pub requests_failed: u64,
    pub requests_per_second: f64,
    /// Successful share of completed requests, in percent.
    pub success_rate: f64,
    pub concurrent_requests: i64,
    pub max_concurrent: i64,
    /// Concurrency as a fraction of the configured maximum.
    pub server_load: f64,
    pub memory_bytes: u64,
    pub cpu_fraction: f64,
    #[serde(with = "humantime_serde")]
    pub p50_response_time: Duration,
    #[serde(with = "humantime_serde")]
    pub p90_response_time: Duration,
    #[serde(with = "humantime_serde")]
    pub p99_response_time: Duration,
    #[serde(with = "humantime_serde")]
    pub avg_response_time: Duration,
}

impl MetricsCollector {
    /// Create the collector and start its resource sampler.
    ///
    /// `max_concurrent` is the denominator for the server-load metric; it
    /// does not cap admission by itself.
    pub fn new(max_concurrent: i64) -> Self {
        let inner = Arc::new(Inner {
            start_instant: Instant::now(),
            started_at: Utc::now(),
            requests_total: AtomicU64::new(0),
            requests_succeeded: AtomicU64::new(0),
            requests_failed: AtomicU64::new(0),
            current_concurrent: AtomicI64::new(0),
            max_concurrent: max_concurrent.max(1),
            latencies: Mutex::new(LatencyRing::new()),
            memory_bytes: AtomicU64::new(0),
            cpu_fraction_bits: AtomicU64::new(0),
            cancel: CancellationToken::new(),
            sampler: Mutex::new(None),
        });

        let sampler = tokio::spawn(run_sampler(Arc::clone(&inner)));
        *inner.sampler.lock().unwrap() = Some(sampler);

        Self { inner }
    }

    /// Begin measuring one request.
    pub fn record_request(&self) -> RequestTicket {
        self.inner.requests_total.fetch_add(1, Ordering::Relaxed);
        self.inner.current_concurrent.fetch_add(1, Ordering::Relaxed);
        RequestTicket {
            inner: Arc::clone(&self.inner),
            start: Instant::now(),
            completed: false,
        }
    }

    /// Snapshot every metric.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let inner = &self.inner;
        let uptime = inner.start_instant.elapsed();
        let total = inner.requests_total.load(Ordering::Relaxed);
        let succeeded = inner.requests_succeeded.load(Ordering::Relaxed);
        let failed = inner.requests_failed.load(Ordering::Relaxed);
        let concurrent = inner.current_concurrent.load(Ordering::Relaxed);

        let (p50, p90, p99, avg) = {
            let ring = inner.latencies.lock().unwrap();
            (
                ring.percentile(50.0),
                ring.percentile(90.0),
                ring.percentile(99.0),
                ring.average(),
            )
        };

        let success_rate = if total > 0 {
            succeeded as f64 / total as f64 * 100.0
        } else {
            0.0
        };

        MetricsSnapshot {
            started_at: inner.started_at,
            uptime,
            requests_total: total,
            requests_succeeded: succeeded,
            requests_failed: failed,
            requests_per_second: total as f64 / uptime.as_secs_f64().max(f64::EPSILON),
            success_rate,
            concurrent_requests: concurrent,
            max_concurrent: inner.max_concurrent,
            server_load: concurrent as f64 / inner.max_concurrent as f64,
            memory_bytes: inner.memory_bytes.load(Ordering::Relaxed),
            cpu_fraction: f64::from_bits(inner.cpu_fraction_bits.load(Ordering::Relaxed)),
            p50_response_time: p50,
            p90_response_time: p90,
            p99_response_time: p99,
            avg_response_time: avg,
        }
    }

    /// Refresh the resource samples immediately instead of waiting for the
    /// next sampler tick. Used by the stats endpoints.
    pub fn refresh_resources(&self) {
        sample_resources(&self.inner);
    }

    pub fn requests_total(&self) -> u64 {
        self.inner.requests_total.load(Ordering::Relaxed)
    }

    pub fn current_concurrent(&self) -> i64 {
        self.inner.current_concurrent.load(Ordering::Relaxed)
    }

    /// Stop the sampler and wait for it to exit. Idempotent.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();
        let handle = self.inner.sampler.lock().unwrap().take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }
}

async fn run_sampler(inner: Arc<Inner>) {
    let mut ticker = tokio::time::interval(SAMPLE_INTERVAL);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    loop {
        tokio::select! {
            _ = inner.cancel.cancelled() => {
                debug!("resource sampler stopped");
                return;
            }
            _ = ticker.tick() => sample_resources(&inner),
        }
    }
}

fn sample_resources(inner: &Inner) {
    inner
        .memory_bytes
        .store(resident_memory_bytes().unwrap_or(0), Ordering::Relaxed);

    // CPU proxy, not a real usage figure: a bounded blend of runtime task
    // count and the concurrency ratio. Swap in an OS query if real usage
    // ever matters.
    let tasks = tokio::runtime::Handle::try_current()
        .map(|handle| handle.metrics().num_alive_tasks())
        .unwrap_or(0);
    let concurrent = inner.current_concurrent.load(Ordering::Relaxed).max(0) as f64;
    let ratio = concurrent / inner.max_concurrent as f64;
    let cpu = (0.3 * tasks as f64 / 1000.0 + 0.7 * ratio).clamp(0.0, 1.0);
    inner
        .cpu_fraction_bits
        .store(cpu.to_bits(), Ordering::Relaxed);
}

/// Resident set size from /proc/self/statm on Linux.
#[cfg(target_os = "linux")]
fn resident_memory_bytes() -> Option<u64> {
    let statm = std::fs::read_to_string("/proc/self/statm").ok()?;
    let rss_pages: u64 = statm.split_whitespace().nth(1)?.parse().ok()?;
    Some(rss_pages * 4096)
}

#[cfg(not(target_os = "linux"))]
fn resident_memory_bytes() -> Option<u64> {
    None
}
