//! Fixed-size worker pool for bounded compute tasks.
//!
//! A fixed set of workers drains one bounded submission queue. Each
//! submitted task carries its own result channel: single submissions get
//! a oneshot, batches share an mpsc channel whose closure marks the end
//! of the batch. One cancellation signal is shared by every worker; no
//! task is dispatched after it fires.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use futures::Stream;
use tokio::sync::{Mutex, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// A unit of work executed on a pool worker.
pub type Task<T> = Box<dyn FnOnce() -> T + Send + 'static>;

/// Queue depth per worker.
const QUEUE_DEPTH_PER_WORKER: usize = 10;

/// Bound on how long an abrupt shutdown waits for in-flight tasks.
const SHUTDOWN_NOW_GRACE: Duration = Duration::from_millis(50);

enum ResultSink<T> {
    Single(oneshot::Sender<T>),
    Batch(mpsc::Sender<T>),
}

struct Job<T> {
    task: Task<T>,
    sink: ResultSink<T>,
}

/// Pool of `num_workers` tasks draining a bounded submission queue.
pub struct WorkerPool<T> {
    submit_tx: mpsc::Sender<Job<T>>,
    // Workers share the single receiver; the async lock is held only
    // while waiting to dequeue, never while a task runs.
    submit_rx: Arc<Mutex<mpsc::Receiver<Job<T>>>>,
    cancel: CancellationToken,
    workers: std::sync::Mutex<Vec<JoinHandle<()>>>,
}

/// Future-of-result for a single submission.
///
/// Resolves to `None` when the pool was cancelled before the task ran or
/// was shut down while the task was still queued.
pub struct TaskHandle<T> {
    rx: oneshot::Receiver<T>,
}

impl<T> TaskHandle<T> {
    pub async fn result(self) -> Option<T> {
        self.rx.await.ok()
    }
}

/// Lazy, unordered sequence of batch results.
///
/// Produces each result exactly once and ends when every submitted task
/// has produced or been abandoned.
pub struct BatchResults<T> {
    rx: mpsc::Receiver<T>,
}

impl<T> BatchResults<T> {
    pub async fn next(&mut self) -> Option<T> {
        self.rx.recv().await
    }
}

impl<T> Stream for BatchResults<T> {
    type Item = T;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        self.rx.poll_recv(cx)
    }
}

impl<T: Send + 'static> WorkerPool<T> {
    pub fn new(num_workers: usize) -> Self {
        let num_workers = num_workers.max(1);
        let (submit_tx, submit_rx) = mpsc::channel(num_workers * QUEUE_DEPTH_PER_WORKER);
        let submit_rx = Arc::new(Mutex::new(submit_rx));
        let cancel = CancellationToken::new();

        let workers = (0..num_workers)
            .map(|id| {
                let rx = Arc::clone(&submit_rx);
                let cancel = cancel.clone();
                tokio::spawn(run_worker(id, rx, cancel))
            })
            .collect();

        Self {
            submit_tx,
            submit_rx,
            cancel,
            workers: std::sync::Mutex::new(workers),
        }
    }

    /// Enqueue one task.
    ///
    /// Suspends while the queue is full. If the pool is already cancelled
    /// the task never runs and the returned handle resolves to `None`.
    pub async fn submit(&self, task: impl FnOnce() -> T + Send + 'static) -> TaskHandle<T> {
        let (result_tx, result_rx) = oneshot::channel();
        let job = Job {
            task: Box::new(task),
            sink: ResultSink::Single(result_tx),
        };
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                // The job (and its sender) drops here, closing the handle.
            }
            sent = self.submit_tx.send(job) => {
                let _ = sent;
            }
        }
        TaskHandle { rx: result_rx }
    }

    /// Enqueue a batch of tasks.
    ///
    /// Results arrive in completion order, not submission order. Tasks
    /// not submitted before cancellation are abandoned and simply never
    /// appear in the sequence.
    pub async fn submit_batch(
        &self,
        tasks: impl IntoIterator<Item = Task<T>>,
    ) -> BatchResults<T> {
        let tasks: Vec<Task<T>> = tasks.into_iter().collect();
        let (result_tx, result_rx) = mpsc::channel(tasks.len().max(1));

        for task in tasks {
            let job = Job {
                task,
                sink: ResultSink::Batch(result_tx.clone()),
            };
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                sent = self.submit_tx.send(job) => {
                    if sent.is_err() {
                        break;
                    }
                }
            }
        }
        // Dropping the submission-side sender means the stream closes as
        // soon as the last in-flight copy (inside a queued job) is gone.
        drop(result_tx);

        BatchResults { rx: result_rx }
    }

    /// Graceful shutdown: stop dispatching, let in-flight tasks finish,
    /// and return once every worker has exited.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        for worker in self.take_workers() {
            let _ = worker.await;
        }
        // Nothing will run the tasks still queued; drop them so their
        // pending result futures and batch streams close.
        let mut rx = self.submit_rx.lock().await;
        while rx.try_recv().is_ok() {}
    }

    /// Abrupt shutdown: stop dispatching, drop everything still queued
    /// without executing it, and wait only briefly for in-flight tasks.
    ///
    /// Returns within a small bounded time regardless of queue depth.
    pub async fn shutdown_now(&self) {
        self.cancel.cancel();
        {
            let mut rx = self.submit_rx.lock().await;
            while rx.try_recv().is_ok() {}
        }
        let workers = self.take_workers();
        let _ = tokio::time::timeout(
            SHUTDOWN_NOW_GRACE,
            futures::future::join_all(workers),
        )
        .await;
    }

    fn take_workers(&self) -> Vec<JoinHandle<()>> {
        self.workers.lock().unwrap().drain(..).collect()
    }
}

impl<T> Drop for WorkerPool<T> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run_worker<T: Send + 'static>(
    id: usize,
    rx: Arc<Mutex<mpsc::Receiver<Job<T>>>>,
    cancel: CancellationToken,
) {
    loop {
        // Dequeue under the shared lock, then release it before running
        // the task so other workers can pick up work in parallel.
        let job = {
            let mut rx = rx.lock().await;
            tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                job = rx.recv() => job,
            }
        };
        let Some(job) = job else { break };

        let output = (job.task)();
        match job.sink {
            ResultSink::Single(tx) => {
                let _ = tx.send(output);
            }
            ResultSink::Batch(tx) => {
                // Capacity equals batch size, so this never blocks; the
                // receiver may be gone if the caller gave up early.
                let _ = tx.send(output).await;
            }
        }
    }
    debug!(worker = id, "pool worker exited");
}
