//! Accounting tests for the metrics collector.

use std::time::Duration;

use roster::metrics::{MetricsCollector, RequestOutcome};

#[tokio::test]
async fn counters_satisfy_the_accounting_identity() {
    let metrics = MetricsCollector::new(100);

    let first = metrics.record_request();
    let second = metrics.record_request();
    let third = metrics.record_request();

    first.complete(RequestOutcome::Success);
    second.complete(RequestOutcome::Failure);
    // `third` is still in flight.

    let snapshot = metrics.snapshot();
    assert_eq!(snapshot.requests_total, 3);
    assert_eq!(snapshot.requests_succeeded, 1);
    assert_eq!(snapshot.requests_failed, 1);
    assert_eq!(
        snapshot.requests_total,
        snapshot.requests_succeeded + snapshot.requests_failed + snapshot.concurrent_requests as u64
    );

    third.complete(RequestOutcome::Success);
    metrics.shutdown().await;
}

#[tokio::test]
async fn concurrency_gauge_returns_to_baseline() {
    let metrics = MetricsCollector::new(10);
    assert_eq!(metrics.current_concurrent(), 0);

    let ticket = metrics.record_request();
    assert_eq!(metrics.current_concurrent(), 1);

    ticket.complete(RequestOutcome::Success);
    assert_eq!(metrics.current_concurrent(), 0);
    metrics.shutdown().await;
}

#[tokio::test]
async fn dropping_an_uncompleted_ticket_records_a_failure() {
    let metrics = MetricsCollector::new(10);

    {
        let _ticket = metrics.record_request();
        // Dropped without complete(): the request still finishes its
        // accounting exactly once.
    }

    let snapshot = metrics.snapshot();
    assert_eq!(snapshot.requests_total, 1);
    assert_eq!(snapshot.requests_failed, 1);
    assert_eq!(snapshot.concurrent_requests, 0);
    metrics.shutdown().await;
}

#[tokio::test]
async fn percentiles_are_ordered_over_varied_samples() {
    let metrics = MetricsCollector::new(10);

    for delay_ms in [1u64, 2, 5, 10, 20, 40] {
        let ticket = metrics.record_request();
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        ticket.complete(RequestOutcome::Success);
    }

    let snapshot = metrics.snapshot();
    assert!(snapshot.p50_response_time <= snapshot.p90_response_time);
    assert!(snapshot.p90_response_time <= snapshot.p99_response_time);
    assert!(snapshot.p99_response_time >= Duration::from_millis(20));
    metrics.shutdown().await;
}

#[tokio::test]
async fn empty_ring_snapshots_to_zero_latencies() {
    let metrics = MetricsCollector::new(10);

    let snapshot = metrics.snapshot();
    assert_eq!(snapshot.p50_response_time, Duration::ZERO);
    assert_eq!(snapshot.p99_response_time, Duration::ZERO);
    assert_eq!(snapshot.avg_response_time, Duration::ZERO);
    assert_eq!(snapshot.success_rate, 0.0);
    metrics.shutdown().await;
}

#[tokio::test]
async fn success_rate_reflects_completed_requests() {
    let metrics = MetricsCollector::new(10);

    for i in 0..10 {
        let ticket = metrics.record_request();
        let outcome = if i < 8 {
            RequestOutcome::Success
        } else {
            RequestOutcome::Failure
        };
        ticket.complete(outcome);
    }

    let snapshot = metrics.snapshot();
    assert!((snapshot.success_rate - 80.0).abs() < f64::EPSILON);
    metrics.shutdown().await;
}

#[tokio::test]
async fn shutdown_is_idempotent() {
    let metrics = MetricsCollector::new(10);
    metrics.shutdown().await;
    metrics.shutdown().await;
}
