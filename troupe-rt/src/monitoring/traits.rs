//! Core monitoring traits for runtime event observation.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use serde::Serialize;

// Layer 3: Internal module imports
use super::types::RuntimeEvent;

/// Event severity levels for filtering and categorization.
///
/// Ordered from lowest to highest severity for filtering purposes.
///
/// # Examples
/// ```rust
/// use troupe_rt::monitoring::EventSeverity;
///
/// assert!(EventSeverity::Error > EventSeverity::Info);
/// assert!(EventSeverity::Info > EventSeverity::Debug);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum EventSeverity {
    /// Debug-level events for development
    Debug,
    /// Informational events for normal operations
    Info,
    /// Warning events for potential issues
    Warning,
    /// Error events for failures
    Error,
}

/// Observer for runtime events.
///
/// Implementations receive every event the runtime emits: actor lifecycle
/// transitions, scheduling decisions, dropped messages, and worker state.
/// Recording happens on the hot path (workers and senders call it inline),
/// so implementations must be cheap and must never block for long.
///
/// The runtime shares one monitor across all cells and workers via
/// `Arc<dyn Monitor>`.
pub trait Monitor: Send + Sync + 'static {
    /// Record a single runtime event.
    fn record(&self, event: RuntimeEvent);
}
