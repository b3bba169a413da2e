//! Actor lifecycle state machine.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use chrono::{DateTime, Utc};

// Layer 3: Internal module imports
// (none)

/// Actor state in the lifecycle state machine.
///
/// # State Transitions
///
/// ```text
/// Starting -> Running -> Stopping -> Stopped
/// ```
///
/// `Stopping` is entered on `Stop` (or a latched self-stop) and persists
/// until every child has reported `Stopped`; only then does the actor run
/// `on_stop` and become `Stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorState {
    /// Cell created; `Start` not yet processed.
    Starting,

    /// Actor is running and processing messages.
    Running,

    /// Actor is shutting down, awaiting its children.
    Stopping,

    /// Actor has stopped; the cell is released.
    Stopped,
}

impl Default for ActorState {
    fn default() -> Self {
        Self::Starting
    }
}

/// Lifecycle tracker recording the current state and its transition time.
///
/// # Examples
///
/// ```rust
/// use troupe_rt::actor::{ActorLifecycle, ActorState};
///
/// let mut lifecycle = ActorLifecycle::new();
/// assert_eq!(lifecycle.state(), ActorState::Starting);
///
/// lifecycle.transition_to(ActorState::Running);
/// assert!(lifecycle.is_running());
/// ```
#[derive(Debug, Clone)]
pub struct ActorLifecycle {
    state: ActorState,
    last_state_change: DateTime<Utc>,
}

impl ActorLifecycle {
    /// Create a new lifecycle tracker in Starting state.
    pub fn new() -> Self {
        Self {
            state: ActorState::Starting,
            last_state_change: Utc::now(),
        }
    }

    /// Transition to a new state, recording the timestamp.
    pub fn transition_to(&mut self, new_state: ActorState) {
        self.state = new_state;
        self.last_state_change = Utc::now();
    }

    /// Get the current actor state.
    pub fn state(&self) -> ActorState {
        self.state
    }

    /// Get the timestamp of the last state change.
    pub fn last_state_change(&self) -> DateTime<Utc> {
        self.last_state_change
    }

    /// Check if the actor is currently running.
    pub fn is_running(&self) -> bool {
        self.state == ActorState::Running
    }

    /// Check if the actor has begun (or finished) shutting down.
    pub fn is_stopping(&self) -> bool {
        matches!(self.state, ActorState::Stopping | ActorState::Stopped)
    }

    /// Check if the actor is in the terminal state.
    pub fn is_terminal(&self) -> bool {
        self.state == ActorState::Stopped
    }
}

impl Default for ActorLifecycle {
    fn default() -> Self {
        Self::new()
    }
}
