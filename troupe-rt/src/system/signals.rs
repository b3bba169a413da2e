//! OS signal plumbing for graceful shutdown.
//!
//! The handlers only store into a process-global atomic flag (the only
//! operation here that is async-signal-safe); the system's wait loop drains
//! the flag on its next tick. SIGINT and SIGTERM both request shutdown;
//! every other signal is left untouched.

// Layer 1: Standard library imports
use std::sync::atomic::{AtomicBool, Ordering};

// Layer 2: Third-party crate imports
// (nix, unix-only, imported in `install`)

// Layer 3: Internal module imports
use super::errors::SystemError;

static SHUTDOWN_REQUESTED: AtomicBool = AtomicBool::new(false);

/// Consume a pending shutdown request, if any.
///
/// Repeat signals between two calls collapse into one request.
pub(crate) fn take_shutdown_request() -> bool {
    SHUTDOWN_REQUESTED.swap(false, Ordering::AcqRel)
}

/// Install SIGINT and SIGTERM handlers that request graceful shutdown.
///
/// Installation is process-wide; installing again replaces the previous
/// disposition with the same handler and is harmless.
#[cfg(unix)]
pub(crate) fn install() -> Result<(), SystemError> {
    use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};

    extern "C" fn request_shutdown(_signum: nix::libc::c_int) {
        SHUTDOWN_REQUESTED.store(true, Ordering::Release);
    }

    let action = SigAction::new(
        SigHandler::Handler(request_shutdown),
        SaFlags::empty(),
        SigSet::empty(),
    );

    for signal in [Signal::SIGINT, Signal::SIGTERM] {
        // Safety: the handler only performs an atomic store.
        unsafe { sigaction(signal, &action) }
            .map_err(|errno| SystemError::SignalSetup(errno.to_string()))?;
    }

    Ok(())
}

#[cfg(not(unix))]
pub(crate) fn install() -> Result<(), SystemError> {
    Ok(())
}
