//! Placement of runnable cells onto workers.

// Layer 1: Standard library imports
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// Layer 2: Third-party crate imports
use thiserror::Error;

// Layer 3: Internal module imports
use super::worker::{Worker, WorkerSettings};
use crate::actor::ActorCell;
use crate::monitoring::{Monitor, RuntimeEvent, RuntimeEventKind};

/// Errors raised while placing a cell on a worker.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DispatchError {
    /// The worker's runqueue stayed full through the backoff budget.
    /// The cell was returned to idle so a later send can retry the
    /// handshake; its messages remain in the mailbox.
    #[error("runqueue of worker {worker} is full")]
    RunqueueFull {
        /// Index of the saturated worker
        worker: usize,
    },
}

/// Chooses a worker for each runnable cell and enqueues it there.
///
/// Non-pinned cells (and pinned cells that have not run yet) are assigned
/// round-robin via a CAS-advanced cursor; pinned cells stick to the worker
/// that first ran them. The cursor is not perfectly fair under contention,
/// but over many dispatches each worker receives its share.
pub(crate) struct Dispatcher {
    workers: Vec<Worker>,
    current_worker: AtomicUsize,
    monitor: Arc<dyn Monitor>,
}

impl Dispatcher {
    /// Start `num_workers` worker threads and return the dispatcher.
    pub(crate) fn new(
        num_workers: usize,
        settings: WorkerSettings,
        monitor: Arc<dyn Monitor>,
    ) -> std::io::Result<Arc<Dispatcher>> {
        let mut spawn_error = None;

        let dispatcher = Arc::new_cyclic(|weak: &std::sync::Weak<Dispatcher>| {
            let workers = (0..num_workers)
                .map_while(|index| {
                    match Worker::spawn(index, std::sync::Weak::clone(weak), settings, Arc::clone(&monitor)) {
                        Ok(worker) => Some(worker),
                        Err(err) => {
                            spawn_error = Some(err);
                            None
                        }
                    }
                })
                .collect();
            Dispatcher {
                workers,
                current_worker: AtomicUsize::new(0),
                monitor: Arc::clone(&monitor),
            }
        });

        match spawn_error {
            Some(err) => {
                dispatcher.shutdown();
                Err(err)
            }
            None => Ok(dispatcher),
        }
    }

    /// Schedule a cell if it is not scheduled already.
    ///
    /// The CAS on the cell's `idle` flag is the claim: losing it means
    /// another thread already scheduled the cell (or a worker is draining
    /// it), and that path will observe the new message.
    pub(crate) fn dispatch(&self, cell: &Arc<ActorCell>) -> Result<(), DispatchError> {
        if cell.set_scheduled() {
            self.execute(cell)
        } else {
            Ok(())
        }
    }

    /// Pick a worker for a freshly claimed cell and enqueue it.
    fn execute(&self, cell: &Arc<ActorCell>) -> Result<(), DispatchError> {
        let worker = match (cell.affinity(), cell.worker_index()) {
            (true, Some(index)) => index,
            _ => self.next_worker(),
        };
        cell.set_worker(worker);

        match self.workers[worker].enqueue(Arc::clone(cell)) {
            Ok(()) => {
                self.monitor
                    .record(RuntimeEvent::new(RuntimeEventKind::ActorScheduled {
                        actor: cell.name().to_string(),
                        worker,
                    }));
                Ok(())
            }
            Err(err) => {
                // Undo the claim so the next send can retry the handshake;
                // the cell's messages are still in its mailbox.
                cell.set_idle();
                Err(err)
            }
        }
    }

    /// Advance the round-robin cursor by one, mod the pool size.
    fn next_worker(&self) -> usize {
        let mut current = self.current_worker.load(Ordering::Relaxed);
        loop {
            let next = (current + 1) % self.workers.len();
            match self.current_worker.compare_exchange_weak(
                current,
                next,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return next,
                Err(observed) => current = observed,
            }
        }
    }

    /// Number of workers in the pool.
    pub(crate) fn num_workers(&self) -> usize {
        self.workers.len()
    }

    /// Stop every worker, join the threads, and release queued cells.
    /// Idempotent; safe to call more than once.
    pub(crate) fn shutdown(&self) {
        for worker in &self.workers {
            worker.stop();
        }
        for worker in &self.workers {
            worker.join();
        }
        for worker in &self.workers {
            worker.clear_runqueue();
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("workers", &self.workers.len())
            .field("current_worker", &self.current_worker.load(Ordering::Relaxed))
            .finish()
    }
}
