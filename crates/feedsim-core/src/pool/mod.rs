//! Generic bounded worker pool
//!
//! A fixed set of OS threads executes [`Task`]s pulled through a single
//! dispatcher. Results and errors come back on two bounded channels, tagged
//! with the originating task id; completion order is unspecified.
//!
//! Lifecycle: `Created → Running → Draining → Stopped`. [`WorkerPool::stop`]
//! joins every thread before the pool releases its result and error
//! senders, so an output channel can only disconnect once nothing is left
//! that could send on it.

mod task;
mod worker;

use std::fmt;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam::channel::{bounded, select, Receiver, Sender};

use crate::error::{FeedsimError, Result};
pub use task::{Task, TaskError, TaskFailure, TaskResult};
use worker::{run_dispatcher, run_worker, Shared, WorkerChannels};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolState {
    Created,
    Running,
    Draining,
    Stopped,
}

impl fmt::Display for PoolState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PoolState::Created => "created",
            PoolState::Running => "running",
            PoolState::Draining => "draining",
            PoolState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Task accounting reported by [`WorkerPool::stop`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolSummary {
    /// Tasks a worker ran to completion
    pub executed: usize,
    /// Tasks accepted but never run because shutdown had begun
    pub discarded: usize,
    /// Completed tasks whose output could not be delivered before shutdown
    pub dropped_outputs: usize,
}

pub struct WorkerPool<T, R, E> {
    workers: usize,
    state: PoolState,
    tasks_tx: Sender<Task<T, R, E>>,
    tasks_rx: Receiver<Task<T, R, E>>,
    results_tx: Option<Sender<TaskResult<R>>>,
    results_rx: Receiver<TaskResult<R>>,
    errors_tx: Option<Sender<TaskError<E>>>,
    errors_rx: Receiver<TaskError<E>>,
    quit_tx: Option<Sender<()>>,
    quit_rx: Receiver<()>,
    shared: Arc<Shared>,
    handles: Vec<JoinHandle<()>>,
}

impl<T, R, E> WorkerPool<T, R, E>
where
    T: Send + 'static,
    R: Send + 'static,
    E: Send + 'static,
{
    /// Create a pool of `workers` threads whose task, result and error
    /// queues each hold at most `capacity` items
    pub fn new(workers: usize, capacity: usize) -> Self {
        let workers = workers.max(1);
        let (tasks_tx, tasks_rx) = bounded(capacity);
        let (results_tx, results_rx) = bounded(capacity);
        let (errors_tx, errors_rx) = bounded(capacity);
        let (quit_tx, quit_rx) = bounded(0);

        Self {
            workers,
            state: PoolState::Created,
            tasks_tx,
            tasks_rx,
            results_tx: Some(results_tx),
            results_rx,
            errors_tx: Some(errors_tx),
            errors_rx,
            quit_tx: Some(quit_tx),
            quit_rx,
            shared: Arc::new(Shared::default()),
            handles: Vec::new(),
        }
    }

    pub fn state(&self) -> PoolState {
        self.state
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Spawn the workers and the dispatcher
    pub fn start(&mut self) -> Result<()> {
        if self.state != PoolState::Created {
            return Err(FeedsimError::PoolClosed {
                state: self.state.to_string(),
            });
        }

        let (results_tx, errors_tx) = match (&self.results_tx, &self.errors_tx) {
            (Some(r), Some(e)) => (r.clone(), e.clone()),
            _ => {
                return Err(FeedsimError::PoolClosed {
                    state: self.state.to_string(),
                })
            }
        };
        let (registry_tx, registry_rx) = bounded(self.workers);

        for id in 0..self.workers {
            let channels = WorkerChannels {
                registry: registry_tx.clone(),
                results: results_tx.clone(),
                errors: errors_tx.clone(),
                quit: self.quit_rx.clone(),
            };
            let shared = Arc::clone(&self.shared);
            let handle = thread::Builder::new()
                .name(format!("feedsim-worker-{}", id))
                .spawn(move || run_worker(id, channels, shared))
                .map_err(|e| spawn_error("worker", e))?;
            self.handles.push(handle);
        }

        let tasks_rx = self.tasks_rx.clone();
        let quit_rx = self.quit_rx.clone();
        let shared = Arc::clone(&self.shared);
        let handle = thread::Builder::new()
            .name("feedsim-dispatcher".to_string())
            .spawn(move || run_dispatcher(tasks_rx, registry_rx, quit_rx, shared))
            .map_err(|e| spawn_error("dispatcher", e))?;
        self.handles.push(handle);

        self.state = PoolState::Running;
        tracing::debug!(workers = self.workers, "pool_started");
        Ok(())
    }

    /// Queue a task, blocking while the task queue is full
    pub fn submit(&self, task: Task<T, R, E>) -> Result<()> {
        if self.state != PoolState::Running {
            return Err(FeedsimError::PoolClosed {
                state: self.state.to_string(),
            });
        }
        select! {
            send(self.tasks_tx, task) -> res => res.map_err(|_| FeedsimError::PoolClosed {
                state: PoolState::Stopped.to_string(),
            }),
            recv(self.quit_rx) -> _ => Err(FeedsimError::PoolClosed {
                state: PoolState::Draining.to_string(),
            }),
        }
    }

    /// Receiver for successful task outputs
    pub fn results(&self) -> &Receiver<TaskResult<R>> {
        &self.results_rx
    }

    /// Receiver for task failures
    pub fn errors(&self) -> &Receiver<TaskError<E>> {
        &self.errors_rx
    }

    /// Stop accepting work, wait for running tasks, then close the outputs.
    ///
    /// Tasks still queued are discarded. Callers that need every output must
    /// drain the result and error receivers before calling this.
    pub fn stop(&mut self) -> PoolSummary {
        if self.state == PoolState::Running {
            self.state = PoolState::Draining;
            self.shared.draining.store(true, Ordering::SeqCst);
            drop(self.quit_tx.take());

            for handle in self.handles.drain(..) {
                if handle.join().is_err() {
                    tracing::error!("pool thread panicked outside a task");
                }
            }

            let queued = self.tasks_rx.try_iter().count();
            self.shared.discarded.fetch_add(queued, Ordering::SeqCst);
        }

        drop(self.quit_tx.take());
        drop(self.results_tx.take());
        drop(self.errors_tx.take());
        self.state = PoolState::Stopped;

        let summary = PoolSummary {
            executed: self.shared.executed.load(Ordering::SeqCst),
            discarded: self.shared.discarded.load(Ordering::SeqCst),
            dropped_outputs: self.shared.dropped_outputs.load(Ordering::SeqCst),
        };
        tracing::debug!(
            executed = summary.executed,
            discarded = summary.discarded,
            dropped_outputs = summary.dropped_outputs,
            "pool_stopped"
        );
        summary
    }
}

fn spawn_error(role: &str, error: std::io::Error) -> FeedsimError {
    FeedsimError::FailedOperation {
        operation: format!("spawn {} thread", role),
        reason: error.to_string(),
    }
}

impl<T, R, E> Drop for WorkerPool<T, R, E> {
    fn drop(&mut self) {
        // Threads must not outlive the handle; mirror `stop` without the report
        if self.state == PoolState::Running {
            self.shared.draining.store(true, Ordering::SeqCst);
            drop(self.quit_tx.take());
            for handle in self.handles.drain(..) {
                let _ = handle.join();
            }
        }
    }
}
