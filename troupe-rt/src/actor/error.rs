//! Actor-level error types.

// Layer 1: Standard library imports
use std::error::Error;

// Layer 2: Third-party crate imports
use thiserror::Error as ThisError;

// Layer 3: Internal module imports
// (none)

/// Error type returned by actor handler hooks.
///
/// Handlers can fail with any error type; the runtime records the failure
/// and stops the faulted cell (it imposes no restart strategy).
pub type ActorError = Box<dyn Error + Send + Sync + 'static>;

/// Errors raised when sending a message.
#[derive(ThisError, Debug)]
pub enum SendError {
    /// The target's mailbox is at capacity; the message was not queued.
    /// The caller decides whether to retry, drop, or escalate.
    #[error("mailbox of actor '{actor}' is full (capacity {capacity})")]
    MailboxFull {
        /// Target cell name
        actor: String,
        /// Target mailbox capacity
        capacity: usize,
    },

    /// The target cell has terminated and been released.
    #[error("actor '{actor}' has already stopped")]
    ActorStopped {
        /// Target cell name
        actor: String,
    },

    /// The chosen worker's runqueue stayed full through the dispatch
    /// backoff budget. The message **is** queued in the target's mailbox
    /// and will be drained by a later successful dispatch; only its
    /// delivery is delayed.
    #[error("worker runqueue saturated; delivery to actor '{actor}' is delayed")]
    Busy {
        /// Target cell name
        actor: String,
    },
}

impl SendError {
    /// Check if the error is transient (a retry may succeed).
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::MailboxFull { .. } | Self::Busy { .. })
    }

    /// Check if the message ended up queued despite the error.
    ///
    /// True only for [`SendError::Busy`]: the push succeeded and the
    /// message awaits the next dispatch of the target cell.
    pub fn message_is_queued(&self) -> bool {
        matches!(self, Self::Busy { .. })
    }
}

/// Errors raised when creating a new actor cell.
#[derive(ThisError, Debug)]
pub enum SpawnError {
    /// The parent has begun stopping; a child spawned now would miss the
    /// already-finished `Stop` broadcast and wedge its parent's shutdown.
    #[error("cannot spawn '{child}': parent '{parent}' is stopping")]
    Stopping {
        /// Parent cell name
        parent: String,
        /// Requested child name
        child: String,
    },
}
