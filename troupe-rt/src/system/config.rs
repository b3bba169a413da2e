//! System configuration with sensible defaults.

// Layer 1: Standard library
use std::time::Duration;

// Layer 2: Third-party
use serde::{Deserialize, Serialize};

// Layer 3: Internal
// (none)

/// Default per-cell mailbox capacity
pub const DEFAULT_MAILBOX_CAPACITY: usize = 1000;

/// Default per-worker runqueue capacity
pub const DEFAULT_RUNQUEUE_CAPACITY: usize = 1000;

/// Default maximum messages drained from one cell per worker visit
pub const DEFAULT_THROUGHPUT: usize = 8;

/// System-wide configuration for the actor runtime.
///
/// # Examples
///
/// ```rust
/// use troupe_rt::system::{SystemConfig, DEFAULT_THROUGHPUT};
///
/// // Use default configuration (one worker per online core)
/// let config = SystemConfig::default();
/// assert_eq!(config.throughput, DEFAULT_THROUGHPUT);
///
/// // Use builder for custom configuration
/// let config = SystemConfig::builder()
///     .with_num_workers(2)
///     .with_throughput(4)
///     .build()
///     .unwrap();
/// assert_eq!(config.num_workers, 2);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    /// Number of worker threads; each is pinned to core `index % cores`
    pub num_workers: usize,

    /// Per-cell mailbox bound
    pub mailbox_capacity: usize,

    /// Per-worker runqueue bound
    pub runqueue_capacity: usize,

    /// Maximum messages drained from one cell per worker visit
    pub throughput: usize,

    /// Optional wall-clock ceiling per worker visit (`None` disables it)
    pub throughput_deadline: Option<Duration>,

    /// Whether new cells stick to the first worker that runs them
    pub default_affinity: bool,

    /// Whether to install SIGINT/SIGTERM handlers for graceful shutdown
    pub install_signal_handlers: bool,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            num_workers: num_cpus::get().max(1),
            mailbox_capacity: DEFAULT_MAILBOX_CAPACITY,
            runqueue_capacity: DEFAULT_RUNQUEUE_CAPACITY,
            throughput: DEFAULT_THROUGHPUT,
            throughput_deadline: None,
            default_affinity: true,
            install_signal_handlers: true,
        }
    }
}

impl SystemConfig {
    /// Create a new configuration builder.
    pub fn builder() -> SystemConfigBuilder {
        SystemConfigBuilder::default()
    }

    /// Validate configuration values.
    ///
    /// Returns `Err` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.num_workers == 0 {
            return Err("num_workers must be > 0".to_string());
        }

        if self.mailbox_capacity == 0 {
            return Err("mailbox_capacity must be > 0".to_string());
        }

        if self.runqueue_capacity == 0 {
            return Err("runqueue_capacity must be > 0".to_string());
        }

        if self.throughput == 0 {
            return Err("throughput must be > 0".to_string());
        }

        Ok(())
    }
}

/// Builder for SystemConfig with fluent API.
#[derive(Debug, Default)]
pub struct SystemConfigBuilder {
    config: SystemConfig,
}

impl SystemConfigBuilder {
    /// Set the number of worker threads.
    pub fn with_num_workers(mut self, num_workers: usize) -> Self {
        self.config.num_workers = num_workers;
        self
    }

    /// Set the per-cell mailbox capacity.
    pub fn with_mailbox_capacity(mut self, capacity: usize) -> Self {
        self.config.mailbox_capacity = capacity;
        self
    }

    /// Set the per-worker runqueue capacity.
    pub fn with_runqueue_capacity(mut self, capacity: usize) -> Self {
        self.config.runqueue_capacity = capacity;
        self
    }

    /// Set the maximum messages drained per worker visit.
    pub fn with_throughput(mut self, throughput: usize) -> Self {
        self.config.throughput = throughput;
        self
    }

    /// Set the wall-clock ceiling per worker visit; `None` disables it.
    pub fn with_throughput_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.config.throughput_deadline = deadline;
        self
    }

    /// Set whether new cells stick to their first worker.
    pub fn with_default_affinity(mut self, affinity: bool) -> Self {
        self.config.default_affinity = affinity;
        self
    }

    /// Enable or disable SIGINT/SIGTERM handler installation.
    pub fn with_signal_handlers(mut self, install: bool) -> Self {
        self.config.install_signal_handlers = install;
        self
    }

    /// Build and validate the configuration.
    ///
    /// Returns `Err` if configuration is invalid.
    pub fn build(self) -> Result<SystemConfig, String> {
        self.config.validate()?;
        Ok(self.config)
    }
}
