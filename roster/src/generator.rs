//! Name list production on top of the worker pool.
//!
//! An explicit process-wide component, constructed during startup and
//! injected into the pipeline. Each request turns into a batch of compute
//! tasks; the caller's cancellation handle bounds how long we drain the
//! batch, and anything cut short is surfaced as an incomplete result.

use std::sync::Arc;

use dashmap::DashMap;
use rand::Rng;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::names;
use crate::pool::{Task, WorkerPool};

/// Outcome of one generation call.
///
/// `complete` is false when cancellation cut the batch short; incomplete
/// lists must not be promoted into shared caches.
#[derive(Debug, Clone)]
pub struct Generated {
    pub names: Vec<String>,
    pub complete: bool,
}

impl Generated {
    fn complete(names: Vec<String>) -> Self {
        Self {
            names,
            complete: true,
        }
    }
}

/// Produces name lists for a requested initial letter.
pub struct NameGenerator {
    pool: WorkerPool<String>,
    // Fully produced lists, memoized per "letter:count". Incomplete
    // results never land here.
    memo: DashMap<String, Arc<Vec<String>>>,
}

impl NameGenerator {
    pub fn new(num_workers: usize) -> Self {
        Self {
            pool: WorkerPool::new(num_workers),
            memo: DashMap::new(),
        }
    }

    /// Produce up to `count` names starting with `letter`.
    ///
    /// The letter is normalized to its uppercase first character; an empty
    /// letter picks one at random, and a letter outside the table yields
    /// an empty (complete) result. `count` is clamped to the table size.
    pub async fn generate(
        &self,
        cancel: &CancellationToken,
        letter: &str,
        count: usize,
    ) -> Generated {
        if count == 0 {
            return Generated::complete(Vec::new());
        }

        let letter = normalize_letter(letter);
        let Some(list) = names::for_letter(letter) else {
            return Generated::complete(Vec::new());
        };
        let count = count.min(list.len());

        let memo_key = format!("{letter}:{count}");
        if let Some(hit) = self.memo.get(&memo_key) {
            return Generated::complete(hit.value().as_ref().clone());
        }

        let tasks: Vec<Task<String>> = (0..count)
            .map(|_| {
                Box::new(move || {
                    let idx = rand::thread_rng().gen_range(0..list.len());
                    list[idx].to_string()
                }) as Task<String>
            })
            .collect();

        let mut results = self.pool.submit_batch(tasks).await;
        let mut produced = Vec::with_capacity(count);
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!(%letter, want = count, got = produced.len(),
                        "generation cancelled, returning partial result");
                    return Generated {
                        names: produced,
                        complete: false,
                    };
                }
                item = results.next() => match item {
                    Some(name) => {
                        produced.push(name);
                        if produced.len() == count {
                            break;
                        }
                    }
                    None => break,
                },
            }
        }

        let complete = produced.len() == count;
        if complete {
            self.memo
                .insert(memo_key, Arc::new(produced.clone()));
        }
        Generated {
            names: produced,
            complete,
        }
    }

    /// Graceful shutdown of the underlying pool.
    pub async fn shutdown(&self) {
        self.pool.shutdown().await;
    }
}

fn normalize_letter(letter: &str) -> char {
    match letter.chars().next() {
        Some(c) => c.to_ascii_uppercase(),
        None => {
            let idx = rand::thread_rng().gen_range(0..names::LETTERS.len());
            names::LETTERS[idx]
        }
    }
}
