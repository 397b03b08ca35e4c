//! Behavioral tests for the worker pool.

use std::time::{Duration, Instant};

use roster::pool::{Task, WorkerPool};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn single_submission_returns_the_task_result() {
    let pool: WorkerPool<u64> = WorkerPool::new(2);

    let handle = pool.submit(|| 41 + 1).await;
    assert_eq!(handle.result().await, Some(42));

    pool.shutdown().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn batch_produces_every_result_exactly_once() {
    let pool: WorkerPool<usize> = WorkerPool::new(4);

    let tasks: Vec<Task<usize>> = (0..50usize)
        .map(|i| Box::new(move || i) as Task<usize>)
        .collect();
    let mut results = pool.submit_batch(tasks).await;

    let mut collected = Vec::new();
    while let Some(value) = results.next().await {
        collected.push(value);
    }
    collected.sort_unstable();
    assert_eq!(collected, (0..50).collect::<Vec<_>>());

    pool.shutdown().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn batch_larger_than_queue_capacity_completes() {
    // 1 worker means a queue bound of 10; a 40-task batch forces the
    // submitter to suspend while workers drain.
    let pool: WorkerPool<usize> = WorkerPool::new(1);

    let tasks: Vec<Task<usize>> = (0..40usize)
        .map(|i| Box::new(move || i * 2) as Task<usize>)
        .collect();
    let mut results = pool.submit_batch(tasks).await;

    let mut count = 0;
    while results.next().await.is_some() {
        count += 1;
    }
    assert_eq!(count, 40);

    pool.shutdown().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn submission_after_shutdown_yields_a_closed_future() {
    let pool: WorkerPool<u8> = WorkerPool::new(2);
    pool.shutdown().await;

    let handle = pool.submit(|| 1).await;
    assert_eq!(handle.result().await, None);

    let mut results = pool
        .submit_batch(vec![Box::new(|| 2u8) as Task<u8>])
        .await;
    assert_eq!(results.next().await, None);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn shutdown_now_returns_quickly_with_a_full_queue() {
    let pool: WorkerPool<()> = WorkerPool::new(2);

    // Fill the queue (capacity 20) with slow tasks; two start running,
    // the rest sit queued.
    let tasks: Vec<Task<()>> = (0..20)
        .map(|_| Box::new(|| std::thread::sleep(Duration::from_millis(20))) as Task<()>)
        .collect();
    let mut results = pool.submit_batch(tasks).await;

    let start = Instant::now();
    pool.shutdown_now().await;
    assert!(
        start.elapsed() < Duration::from_millis(100),
        "shutdown_now took {:?}",
        start.elapsed()
    );

    // Abandoned tasks never produce; the stream must still terminate.
    let mut produced = 0;
    while results.next().await.is_some() {
        produced += 1;
    }
    assert!(produced < 20, "queued tasks should have been abandoned");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn graceful_shutdown_waits_for_workers() {
    let pool: WorkerPool<u8> = WorkerPool::new(3);
    let handle = pool.submit(|| {
        std::thread::sleep(Duration::from_millis(30));
        7
    }).await;

    // Give a worker time to dequeue the task before cancelling.
    tokio::time::sleep(Duration::from_millis(10)).await;
    pool.shutdown().await;

    // The in-flight task ran to completion.
    assert_eq!(handle.result().await, Some(7));
}
