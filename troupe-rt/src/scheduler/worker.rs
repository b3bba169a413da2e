//! Worker threads draining actor cells in bounded batches.

// Layer 1: Standard library imports
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

// Layer 2: Third-party crate imports
use parking_lot::{Condvar, Mutex};

// Layer 3: Internal module imports
use super::dispatcher::{DispatchError, Dispatcher};
use crate::actor::ActorCell;
use crate::monitoring::{Monitor, RuntimeEvent, RuntimeEventKind};

/// How many times a full runqueue is retried before dispatch gives up.
const ENQUEUE_RETRY_LIMIT: usize = 64;

/// Per-worker tuning inherited from the system configuration.
#[derive(Debug, Clone, Copy)]
pub(crate) struct WorkerSettings {
    /// Bound of the local runqueue.
    pub(crate) runqueue_capacity: usize,
    /// Maximum messages drained from one cell per visit.
    pub(crate) throughput: usize,
    /// Optional wall-clock ceiling per visit; `None` disables the deadline.
    pub(crate) throughput_deadline: Option<Duration>,
}

/// One scheduling thread with its local runqueue.
pub(crate) struct Worker {
    shared: Arc<WorkerShared>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

struct WorkerShared {
    index: usize,
    core: usize,
    settings: WorkerSettings,
    runqueue: Mutex<VecDeque<Arc<ActorCell>>>,
    not_empty: Condvar,
    stop: AtomicBool,
    dispatcher: Weak<Dispatcher>,
    monitor: Arc<dyn Monitor>,
}

impl Worker {
    /// Start a worker thread named `worker-<index>`, pinned to
    /// `index % online_cores`.
    pub(crate) fn spawn(
        index: usize,
        dispatcher: Weak<Dispatcher>,
        settings: WorkerSettings,
        monitor: Arc<dyn Monitor>,
    ) -> std::io::Result<Worker> {
        let shared = Arc::new(WorkerShared {
            index,
            core: index % num_cpus::get().max(1),
            settings,
            runqueue: Mutex::new(VecDeque::new()),
            not_empty: Condvar::new(),
            stop: AtomicBool::new(false),
            dispatcher,
            monitor,
        });

        let thread_shared = Arc::clone(&shared);
        let handle = thread::Builder::new()
            .name(format!("worker-{index}"))
            .spawn(move || thread_shared.run())?;

        Ok(Worker {
            shared,
            handle: Mutex::new(Some(handle)),
        })
    }

    /// Place a runnable cell on this worker's runqueue.
    ///
    /// Blocks with a bounded yield backoff while the queue is full; after
    /// the retry budget the cell is *not* queued and the caller receives
    /// [`DispatchError::RunqueueFull`].
    pub(crate) fn enqueue(&self, cell: Arc<ActorCell>) -> Result<(), DispatchError> {
        let mut cell = Some(cell);
        for _ in 0..ENQUEUE_RETRY_LIMIT {
            {
                let mut queue = self.shared.runqueue.lock();
                if queue.len() < self.shared.settings.runqueue_capacity {
                    if let Some(cell) = cell.take() {
                        queue.push_back(cell);
                    }
                    self.shared.not_empty.notify_one();
                    return Ok(());
                }
            }
            thread::yield_now();
        }

        self.shared
            .monitor
            .record(RuntimeEvent::new(RuntimeEventKind::RunqueueSaturated {
                worker: self.shared.index,
            }));
        Err(DispatchError::RunqueueFull {
            worker: self.shared.index,
        })
    }

    /// Ask the thread to exit at its current cell boundary.
    pub(crate) fn stop(&self) {
        let _guard = self.shared.runqueue.lock();
        self.shared.stop.store(true, Ordering::Release);
        self.shared.not_empty.notify_all();
    }

    /// Join the worker thread. Idempotent.
    pub(crate) fn join(&self) {
        let handle = self.handle.lock().take();
        if let Some(handle) = handle {
            let _ = handle.join();
        }
    }

    /// Drop any cells still queued. Called after join to release the
    /// remaining owning references at teardown.
    pub(crate) fn clear_runqueue(&self) {
        self.shared.runqueue.lock().clear();
    }
}

impl WorkerShared {
    fn run(&self) {
        pin_to_core(self.core);
        self.monitor
            .record(RuntimeEvent::new(RuntimeEventKind::WorkerStarted {
                worker: self.index,
            }));

        loop {
            let cell = {
                let mut queue = self.runqueue.lock();
                let mut cell = queue.pop_front();
                if cell.is_none() && !self.stop.load(Ordering::Acquire) {
                    self.not_empty.wait(&mut queue);
                    cell = queue.pop_front();
                }
                cell
            };

            if self.stop.load(Ordering::Acquire) {
                break;
            }
            let Some(cell) = cell else {
                continue;
            };

            // One visit: drain up to `throughput` messages, bounded by the
            // optional wall-clock deadline. The deadline is checked between
            // messages, so a visit always makes progress on at least one.
            let mut left = self.settings.throughput;
            let deadline = self
                .settings
                .throughput_deadline
                .map(|limit| Instant::now() + limit);

            let keep_going = loop {
                let keep_going = cell.process();
                left -= 1;
                if !keep_going {
                    break false;
                }
                if left == 0 {
                    break true;
                }
                if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                    break true;
                }
            };

            if keep_going {
                cell.set_idle();

                // A message pushed after the batch but before set_idle would
                // otherwise be stranded: its sender's dispatch saw the cell
                // scheduled and backed off. The emptiness recheck closes the
                // window.
                if !cell.mailbox_is_empty() {
                    if let Some(dispatcher) = self.dispatcher.upgrade() {
                        let _ = dispatcher.dispatch(&cell);
                    }
                }
            }
        }

        self.monitor
            .record(RuntimeEvent::new(RuntimeEventKind::WorkerStopped {
                worker: self.index,
            }));
    }
}

#[cfg(target_os = "linux")]
fn pin_to_core(core: usize) {
    use nix::sched::{sched_setaffinity, CpuSet};
    use nix::unistd::Pid;

    let mut cpu_set = CpuSet::new();
    // Pinning is best-effort; an invalid core leaves the thread unpinned.
    if cpu_set.set(core).is_ok() {
        let _ = sched_setaffinity(Pid::from_raw(0), &cpu_set);
    }
}

#[cfg(not(target_os = "linux"))]
fn pin_to_core(_core: usize) {}
