//! # troupe-rt - Thread-Based In-Process Actor Runtime
//!
//! Lightweight actor system scheduling isolated units of computation across
//! a fixed pool of pinned OS worker threads, with supervision-tree shutdown
//! and bounded cooperative batching.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use troupe_rt::prelude::*;
//!
//! static GREET: MessageType = MessageType::new("Greet");
//!
//! struct Greeter {
//!     remaining: u32,
//! }
//!
//! impl Actor for Greeter {
//!     fn on_receive(
//!         &mut self,
//!         msg: &Message,
//!         ctx: &mut ActorContext<'_>,
//!     ) -> Result<(), ActorError> {
//!         if msg.is(&GREET) {
//!             self.remaining -= 1;
//!             if self.remaining == 0 {
//!                 ctx.stop_self();
//!             }
//!         }
//!         Ok(())
//!     }
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SystemConfig::builder().with_num_workers(2).build()?;
//!     let system = ActorSystem::new(config)?;
//!
//!     let greeter = system.spawn("Greeter", Greeter { remaining: 3 })?;
//!     for _ in 0..3 {
//!         system.send(&greeter, &GREET, None)?;
//!     }
//!
//!     // Returns once the greeter has stopped itself and the root followed.
//!     system.wait_children()?;
//!     Ok(())
//! }
//! ```
//!
//! # Core Model
//!
//! - **Actors** implement [`actor::Actor`]: three hooks (`on_start`,
//!   `on_receive`, `on_stop`) invoked one message at a time, never
//!   concurrently for the same actor.
//! - **Cells** carry an actor's mailbox, supervision links, and scheduling
//!   state. Parents own their children; stopping a parent stops its
//!   children first, and the parent only finishes once every child has
//!   reported `Stopped`.
//! - **Workers** are dedicated OS threads pinned to cores. A worker drains
//!   a cell in bounded batches (`throughput` messages, optional wall-clock
//!   deadline) for soft fairness across cells sharing a worker.
//! - **Dispatch** is a lock-free handshake on each cell's `idle` flag plus
//!   round-robin worker assignment; pinned cells stick to the worker that
//!   first ran them.
//! - **Messages** are dynamically typed: a static [`message::MessageType`]
//!   descriptor plus an optional boxed payload. Per sender/receiver pair,
//!   delivery order is FIFO.
//!
//! # Shutdown
//!
//! SIGINT/SIGTERM (or [`system::ActorSystem::request_shutdown`]) broadcast
//! `Stop` to every top-level actor. Shutdown is cooperative and
//! depth-first: children stop before parents, each stopping cell runs
//! `on_stop` exactly once, and [`system::ActorSystem::wait_children`]
//! returns only after every worker thread has been joined and every cell
//! released.
//!
//! # Module Organization
//!
//! - [`actor`] - Actor trait, cells, refs, and the handler-side context
//! - [`message`] - Message types, dense-id registration, and envelopes
//! - [`mailbox`] - Bounded per-cell message queuing
//! - [`system`] - ActorSystem, configuration, and signal handling
//! - [`monitoring`] - Runtime event observation
//! - [`util`] - Identifiers

pub mod actor;
pub mod mailbox;
pub mod message;
pub mod monitoring;
pub mod system;
pub mod util;

pub(crate) mod scheduler;

// Re-export commonly used types
pub use actor::{Actor, ActorContext, ActorError, ActorRef, SendError, SpawnError};
pub use mailbox::{Mailbox, MailboxError};
pub use message::{Message, MessageType, MessageTypeId, MessageTypeRegistry, START, STOP, STOPPED};
pub use monitoring::{EventSeverity, InMemoryMonitor, Monitor, NoopMonitor, RuntimeEvent, RuntimeEventKind};
pub use system::{ActorSystem, SystemConfig, SystemError};
pub use util::ActorId;

/// Convenience re-exports for user code.
pub mod prelude {
    pub use crate::actor::{Actor, ActorContext, ActorError, ActorRef};
    pub use crate::message::{Message, MessageType, START, STOP, STOPPED};
    pub use crate::system::{ActorSystem, SystemConfig};
}
