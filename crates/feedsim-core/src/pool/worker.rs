//! Worker and dispatcher loops
//!
//! An idle worker publishes its private inbound sender on the registry
//! channel. The dispatcher pairs each queued task with the next registered
//! worker, so faster workers naturally take more tasks. Closing the quit
//! channel (dropping its only sender) wakes every blocked `select!`.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use crossbeam::channel::{bounded, select, Receiver, Sender, TrySendError};

use super::task::{Task, TaskError, TaskResult};

/// Counters shared between the pool handle and its threads
#[derive(Debug, Default)]
pub(crate) struct Shared {
    pub draining: AtomicBool,
    pub executed: AtomicUsize,
    pub discarded: AtomicUsize,
    pub dropped_outputs: AtomicUsize,
}

impl Shared {
    fn discard(&self, count: usize) {
        self.discarded.fetch_add(count, Ordering::SeqCst);
    }
}

pub(crate) struct WorkerChannels<T, R, E> {
    pub registry: Sender<Sender<Task<T, R, E>>>,
    pub results: Sender<TaskResult<R>>,
    pub errors: Sender<TaskError<E>>,
    pub quit: Receiver<()>,
}

/// Deliver an output without blocking past shutdown
fn deliver<M>(tx: &Sender<M>, msg: M, quit: &Receiver<()>) -> bool {
    match tx.try_send(msg) {
        Ok(()) => true,
        Err(TrySendError::Full(msg)) => select! {
            send(tx, msg) -> res => res.is_ok(),
            recv(quit) -> _ => false,
        },
        Err(TrySendError::Disconnected(_)) => false,
    }
}

pub(crate) fn run_worker<T, R, E>(id: usize, channels: WorkerChannels<T, R, E>, shared: Arc<Shared>) {
    let (inbound_tx, inbound_rx) = bounded::<Task<T, R, E>>(1);

    loop {
        // Registering
        let registered = select! {
            send(channels.registry, inbound_tx.clone()) -> res => res.is_ok(),
            recv(channels.quit) -> _ => false,
        };
        if !registered {
            break;
        }

        // Awaiting
        let task = select! {
            recv(inbound_rx) -> msg => msg.ok(),
            recv(channels.quit) -> _ => None,
        };
        let Some(task) = task else {
            break;
        };

        if shared.draining.load(Ordering::SeqCst) {
            shared.discard(1);
            break;
        }

        // Executing
        let task_id = task.id;
        tracing::trace!(worker = id, task = task_id, "task_start");
        let delivered = match task.run() {
            Ok(result) => deliver(&channels.results, result, &channels.quit),
            Err(error) => deliver(&channels.errors, error, &channels.quit),
        };
        shared.executed.fetch_add(1, Ordering::SeqCst);
        if !delivered {
            shared.dropped_outputs.fetch_add(1, Ordering::SeqCst);
            tracing::warn!(worker = id, task = task_id, "output dropped during shutdown");
        }
    }

    // A task handed over in the same instant as the quit signal never runs
    let stranded = inbound_rx.try_iter().count();
    shared.discard(stranded);
    tracing::trace!(worker = id, "worker_terminated");
}

pub(crate) fn run_dispatcher<T, R, E>(
    tasks: Receiver<Task<T, R, E>>,
    registry: Receiver<Sender<Task<T, R, E>>>,
    quit: Receiver<()>,
    shared: Arc<Shared>,
) {
    loop {
        let task = select! {
            recv(tasks) -> msg => match msg {
                Ok(task) => task,
                Err(_) => return,
            },
            recv(quit) -> _ => return,
        };

        let inbound = select! {
            recv(registry) -> msg => msg.ok(),
            recv(quit) -> _ => None,
        };

        match inbound {
            Some(inbound) if !shared.draining.load(Ordering::SeqCst) => {
                if inbound.send(task).is_err() {
                    shared.discard(1);
                }
            }
            _ => {
                shared.discard(1);
                return;
            }
        }
    }
}
