use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam::channel::select;

use crate::error::{FeedsimError, Result};
use crate::pool::{Task, TaskError, TaskFailure, WorkerPool};
use crate::similarity::{cosine_similarity, Corpus, SimilarPair};

/// How often the collector re-checks whether the producer has finished
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Settings for a pooled pairwise scan
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanOptions {
    pub threshold: f64,
    pub workers: usize,
    pub queue_capacity: usize,
    /// Wall-clock budget for one position's comparisons
    pub task_timeout: Option<Duration>,
}

/// Scores of the document at `position` against every later document
fn row(corpus: &Corpus, position: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
    let source = corpus.vector(position);
    (position + 1..corpus.len()).filter_map(move |other| {
        let score = cosine_similarity(source?, corpus.vector(other)?);
        Some((other, score))
    })
}

fn pair(corpus: &Corpus, position: usize, other: usize, score: f64) -> Option<SimilarPair> {
    Some(SimilarPair {
        source: corpus.document(position)?.id,
        target: corpus.document(other)?.id,
        score,
    })
}

/// Compare the document at `position` with each later document and keep
/// pairs scoring at least `threshold`.
///
/// With a `timeout`, the deadline is checked between comparisons and
/// [`FeedsimError::TaskTimeout`] is returned once it passes.
pub fn compare_from(
    corpus: &Corpus,
    position: usize,
    threshold: f64,
    timeout: Option<Duration>,
) -> Result<Vec<SimilarPair>> {
    let started = Instant::now();
    let mut pairs = Vec::new();

    for (other, score) in row(corpus, position) {
        if let Some(limit) = timeout {
            if started.elapsed() > limit {
                return Err(FeedsimError::TaskTimeout {
                    task_id: position,
                    timeout_ms: limit.as_millis() as u64,
                });
            }
        }
        if score >= threshold {
            pairs.extend(pair(corpus, position, other, score));
        }
    }
    Ok(pairs)
}

/// Sequential offset scan over the whole corpus, ordered by position
pub fn find_similar_pairs(corpus: &Corpus, threshold: f64) -> Vec<SimilarPair> {
    let mut pairs = Vec::new();
    for position in 0..corpus.len() {
        for (other, score) in row(corpus, position) {
            if score >= threshold {
                pairs.extend(pair(corpus, position, other, score));
            }
        }
    }
    pairs
}

fn task_failure(error: TaskError<FeedsimError>) -> FeedsimError {
    match error.failure {
        TaskFailure::Error(e) => e,
        TaskFailure::Panic(reason) => FeedsimError::FailedOperation {
            operation: format!("compare entries from position {}", error.id),
            reason,
        },
    }
}

/// Offset scan with one pool task per position.
///
/// A producer thread submits while this thread drains results and errors,
/// so neither side can stall on a full channel. Every task is collected
/// before the pool stops. Pairs come back sorted by `(source, target)`; the
/// first task failure is returned instead when any task fails.
#[tracing::instrument(skip(corpus, options), fields(documents = corpus.len(), workers = options.workers))]
pub fn find_similar_pairs_parallel(
    corpus: &Arc<Corpus>,
    options: &ScanOptions,
) -> Result<Vec<SimilarPair>> {
    // The last position has nothing after it
    let task_count = corpus.len().saturating_sub(1);
    if task_count == 0 {
        return Ok(Vec::new());
    }

    let mut pool: WorkerPool<usize, Vec<SimilarPair>, FeedsimError> =
        WorkerPool::new(options.workers, options.queue_capacity);
    pool.start()?;

    let results = pool.results().clone();
    let errors = pool.errors().clone();
    let submitted = AtomicUsize::new(0);
    let producer_done = AtomicBool::new(false);
    let threshold = options.threshold;
    let timeout = options.task_timeout;

    let (pairs, first_error, produced) = thread::scope(|scope| {
        let pool_ref = &pool;
        let submitted = &submitted;
        let producer_done = &producer_done;

        let producer = scope.spawn(move || {
            let outcome = (0..task_count).try_for_each(|position| {
                let corpus = Arc::clone(corpus);
                pool_ref.submit(Task::new(position, position, move |pos| {
                    compare_from(&corpus, pos, threshold, timeout)
                }))?;
                submitted.fetch_add(1, Ordering::SeqCst);
                Ok::<(), FeedsimError>(())
            });
            producer_done.store(true, Ordering::SeqCst);
            outcome
        });

        let mut pairs = Vec::new();
        let mut first_error: Option<FeedsimError> = None;
        let mut received = 0;
        loop {
            let finished = producer_done.load(Ordering::SeqCst);
            if finished && received == submitted.load(Ordering::SeqCst) {
                break;
            }
            select! {
                recv(results) -> msg => {
                    if let Ok(result) = msg {
                        pairs.extend(result.value);
                        received += 1;
                    }
                }
                recv(errors) -> msg => {
                    if let Ok(error) = msg {
                        received += 1;
                        tracing::warn!(task = error.id, error = %error, "comparison task failed");
                        first_error.get_or_insert(task_failure(error));
                    }
                }
                default(POLL_INTERVAL) => {}
            }
        }

        let produced = producer.join().unwrap_or_else(|_| {
            Err(FeedsimError::Other("task producer panicked".to_string()))
        });
        (pairs, first_error, produced)
    });

    let summary = pool.stop();
    tracing::debug!(
        tasks = task_count,
        executed = summary.executed,
        discarded = summary.discarded,
        "scan complete"
    );

    produced?;
    if let Some(err) = first_error {
        return Err(err);
    }

    let mut pairs = pairs;
    pairs.sort_by(|a, b| a.source.cmp(&b.source).then_with(|| a.target.cmp(&b.target)));
    Ok(pairs)
}
