//! Zero-overhead monitor that discards all events.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
use super::traits::Monitor;
use super::types::RuntimeEvent;

/// Monitor implementation that does nothing.
///
/// This is the default monitor: `record` is an empty inlined call, so
/// systems that do not care about observability pay nothing for it.
///
/// # Examples
/// ```rust
/// use troupe_rt::monitoring::{Monitor, NoopMonitor, RuntimeEvent, RuntimeEventKind};
///
/// let monitor = NoopMonitor;
/// monitor.record(RuntimeEvent::new(RuntimeEventKind::ShutdownRequested));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMonitor;

impl Monitor for NoopMonitor {
    #[inline]
    fn record(&self, _event: RuntimeEvent) {}
}
