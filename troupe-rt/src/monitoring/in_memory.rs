//! In-memory monitor with bounded event history.

// Layer 1: Standard library imports
use std::collections::VecDeque;

// Layer 2: Third-party crate imports
use parking_lot::Mutex;

// Layer 3: Internal module imports
use super::traits::Monitor;
use super::types::RuntimeEvent;

/// Default maximum number of events retained in history.
pub const DEFAULT_HISTORY_CAPACITY: usize = 4096;

/// Monitor that records events into a bounded in-memory history.
///
/// When the history is full the oldest event is discarded. The history can
/// be inspected with [`InMemoryMonitor::events`], which is how the runtime's
/// own lifecycle tests observe what happened.
///
/// # Examples
/// ```rust
/// use troupe_rt::monitoring::{InMemoryMonitor, Monitor, RuntimeEvent, RuntimeEventKind};
///
/// let monitor = InMemoryMonitor::new();
/// monitor.record(RuntimeEvent::new(RuntimeEventKind::WorkerStarted { worker: 0 }));
/// assert_eq!(monitor.len(), 1);
/// ```
#[derive(Debug)]
pub struct InMemoryMonitor {
    history: Mutex<VecDeque<RuntimeEvent>>,
    capacity: usize,
}

impl InMemoryMonitor {
    /// Create a monitor with the default history capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }

    /// Create a monitor retaining at most `capacity` events.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            history: Mutex::new(VecDeque::with_capacity(capacity.min(1024))),
            capacity,
        }
    }

    /// Snapshot of the recorded events, oldest first.
    pub fn events(&self) -> Vec<RuntimeEvent> {
        self.history.lock().iter().cloned().collect()
    }

    /// Number of events currently retained.
    pub fn len(&self) -> usize {
        self.history.lock().len()
    }

    /// True if no events have been retained.
    pub fn is_empty(&self) -> bool {
        self.history.lock().is_empty()
    }

    /// Drop all retained events.
    pub fn clear(&self) {
        self.history.lock().clear();
    }
}

impl Default for InMemoryMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl Monitor for InMemoryMonitor {
    fn record(&self, event: RuntimeEvent) {
        let mut history = self.history.lock();
        if history.len() == self.capacity {
            history.pop_front();
        }
        history.push_back(event);
    }
}
