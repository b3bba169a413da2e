//! System-level error types.

// Layer 1: Standard library
// (none)

// Layer 2: Third-party
use thiserror::Error;

// Layer 3: Internal
use crate::actor::SpawnError;

/// System-level errors for actor runtime operations.
#[derive(Error, Debug)]
pub enum SystemError {
    /// Configuration validation error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Failed to start the worker pool
    #[error("Failed to start worker pool: {0}")]
    WorkerPoolFailed(String),

    /// System is shutting down, cannot accept new actors
    #[error("System shutdown in progress")]
    ShuttingDown,

    /// Failed to spawn an actor
    #[error("Failed to spawn actor: {0}")]
    SpawnFailed(#[from] SpawnError),

    /// Failed to install signal handlers
    #[error("Failed to install signal handlers: {0}")]
    SignalSetup(String),
}

impl SystemError {
    /// Check if the error is fatal (the system cannot be constructed or
    /// continue operating).
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SystemError::ConfigError(_)
                | SystemError::WorkerPoolFailed(_)
                | SystemError::SignalSetup(_)
        )
    }

    /// Check if the error is recoverable from the caller's point of view.
    pub fn is_recoverable(&self) -> bool {
        !self.is_fatal()
    }
}
