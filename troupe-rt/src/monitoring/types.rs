//! Monitoring event types.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use chrono::{DateTime, Utc};
use serde::Serialize;

// Layer 3: Internal module imports
use super::traits::EventSeverity;

/// A single observable occurrence inside the runtime.
///
/// Events carry their creation timestamp and a kind describing what
/// happened. Severity is derived from the kind.
#[derive(Debug, Clone, Serialize)]
pub struct RuntimeEvent {
    /// Timestamp when the event occurred
    pub timestamp: DateTime<Utc>,

    /// What happened
    pub kind: RuntimeEventKind,
}

impl RuntimeEvent {
    /// Create an event stamped with the current time.
    pub fn new(kind: RuntimeEventKind) -> Self {
        Self {
            timestamp: Utc::now(),
            kind,
        }
    }

    /// Severity of this event, derived from its kind.
    pub fn severity(&self) -> EventSeverity {
        self.kind.severity()
    }
}

/// Specific kinds of runtime events.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum RuntimeEventKind {
    /// A new cell was created and linked into the supervision tree
    ActorSpawned {
        /// Cell name
        actor: String,
    },

    /// A cell finished `on_start` and entered the Running state
    ActorStarted {
        /// Cell name
        actor: String,
    },

    /// A cell received `Stop` (or latched self-stop) and began stopping
    ActorStopping {
        /// Cell name
        actor: String,
    },

    /// A cell completed `on_stop` and was released
    ActorStopped {
        /// Cell name
        actor: String,
    },

    /// A parent unlinked a terminated child after its `Stopped` report
    ChildReaped {
        /// Parent cell name
        parent: String,
        /// Child cell name
        child: String,
    },

    /// A user handler returned an error; the cell will stop
    HandlerFailed {
        /// Cell name
        actor: String,
        /// Display form of the handler error
        error: String,
    },

    /// A user message arrived at a stopping cell and was discarded
    MessageDropped {
        /// Cell name
        actor: String,
        /// Message type name
        message_type: &'static str,
    },

    /// A cell was placed on a worker's runqueue
    ActorScheduled {
        /// Cell name
        actor: String,
        /// Index of the chosen worker
        worker: usize,
    },

    /// A worker thread started its main loop
    WorkerStarted {
        /// Worker index
        worker: usize,
    },

    /// A worker thread exited its main loop
    WorkerStopped {
        /// Worker index
        worker: usize,
    },

    /// A worker runqueue stayed full through the dispatch backoff budget
    RunqueueSaturated {
        /// Worker index
        worker: usize,
    },

    /// Graceful shutdown was requested (signal or programmatic)
    ShutdownRequested,
}

impl RuntimeEventKind {
    /// Map the event kind to a severity level.
    pub fn severity(&self) -> EventSeverity {
        match self {
            Self::ActorSpawned { .. }
            | Self::ActorStarted { .. }
            | Self::ActorStopping { .. }
            | Self::ActorStopped { .. }
            | Self::ChildReaped { .. }
            | Self::ShutdownRequested => EventSeverity::Info,
            Self::ActorScheduled { .. } | Self::WorkerStarted { .. } | Self::WorkerStopped { .. } => {
                EventSeverity::Debug
            }
            Self::MessageDropped { .. } | Self::RunqueueSaturated { .. } => EventSeverity::Warning,
            Self::HandlerFailed { .. } => EventSeverity::Error,
        }
    }
}
