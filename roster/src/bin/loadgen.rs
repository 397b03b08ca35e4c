//! Closed-loop load generator for the roster service.
//!
//! Each worker fires `POST /generate` requests back to back until the
//! duration elapses, then the run prints status counts and latency
//! percentiles.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use clap::Parser;
use hdrhistogram::Histogram;
use serde_json::json;

#[derive(Debug, Parser)]
#[command(name = "roster-loadgen", about = "Load generator for the roster service")]
struct Args {
    /// Base URL of the target server.
    #[arg(long, default_value = "http://127.0.0.1:8080")]
    target: String,
    /// Number of concurrent workers.
    #[arg(long, default_value_t = 32)]
    concurrency: usize,
    /// Test duration, e.g. "10s" or "2m".
    #[arg(long, default_value = "10s", value_parser = humantime::parse_duration)]
    duration: Duration,
    /// Requested initial letter.
    #[arg(long, default_value = "A")]
    letter: String,
    /// Requested number of entries per response.
    #[arg(long, default_value_t = 5)]
    entries: i64,
}

#[derive(Default)]
struct Counters {
    ok: AtomicU64,
    rate_limited: AtomicU64,
    failed: AtomicU64,
    errors: AtomicU64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()?;
    let url = format!("{}/generate", args.target.trim_end_matches('/'));

    let counters = Arc::new(Counters::default());
    let histogram = Arc::new(Mutex::new(Histogram::<u64>::new(3)?));
    let deadline = Instant::now() + args.duration;

    println!(
        "driving {} with {} workers for {}",
        url,
        args.concurrency,
        humantime::format_duration(args.duration)
    );

    let start = Instant::now();
    let mut workers = Vec::with_capacity(args.concurrency);
    for worker_id in 0..args.concurrency {
        let client = client.clone();
        let url = url.clone();
        let counters = Arc::clone(&counters);
        let histogram = Arc::clone(&histogram);
        let letter = args.letter.clone();
        let entries = args.entries;

        workers.push(tokio::spawn(async move {
            let body = json!({
                "session_id": format!("loadgen-{worker_id}"),
                "letter": letter,
                "num_of_entries": entries,
            });
            while Instant::now() < deadline {
                let sent = Instant::now();
                match client.post(&url).json(&body).send().await {
                    Ok(response) => {
                        let elapsed = sent.elapsed();
                        match response.status().as_u16() {
                            200 => counters.ok.fetch_add(1, Ordering::Relaxed),
                            429 => counters.rate_limited.fetch_add(1, Ordering::Relaxed),
                            _ => counters.failed.fetch_add(1, Ordering::Relaxed),
                        };
                        let mut histogram = histogram.lock().unwrap();
                        let _ = histogram.record(elapsed.as_micros() as u64);
                    }
                    Err(_) => {
                        counters.errors.fetch_add(1, Ordering::Relaxed);
                    }
                }
            }
        }));
    }
    for worker in workers {
        let _ = worker.await;
    }
    let elapsed = start.elapsed();

    let ok = counters.ok.load(Ordering::Relaxed);
    let rate_limited = counters.rate_limited.load(Ordering::Relaxed);
    let failed = counters.failed.load(Ordering::Relaxed);
    let errors = counters.errors.load(Ordering::Relaxed);
    let total = ok + rate_limited + failed + errors;

    println!("requests:      {total}");
    println!("  200 ok:      {ok}");
    println!("  429 limited: {rate_limited}");
    println!("  other:       {failed}");
    println!("  transport:   {errors}");
    println!(
        "throughput:    {:.1} req/s",
        total as f64 / elapsed.as_secs_f64()
    );

    let histogram = histogram.lock().unwrap();
    if histogram.len() > 0 {
        for (label, quantile) in [("p50", 0.50), ("p90", 0.90), ("p99", 0.99)] {
            println!(
                "{label} latency:   {:.2}ms",
                histogram.value_at_quantile(quantile) as f64 / 1000.0
            );
        }
    }
    Ok(())
}
