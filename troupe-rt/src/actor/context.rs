//! Handler-side view of a running actor cell.

// Layer 1: Standard library imports
use std::any::Any;
use std::fmt;

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
use super::cell::{ActorCell, ActorRef};
use super::error::{SendError, SpawnError};
use super::traits::Actor;
use crate::message::MessageType;
use crate::util::ActorId;

/// Capabilities available to an actor while one of its hooks is running.
///
/// The context is handed `&mut` into every hook and is only valid for the
/// duration of that call. All operations act on the cell the hook belongs
/// to: spawning creates a child of *this* actor, and messages sent through
/// the context carry *this* actor as the sender.
///
/// # Examples
///
/// ```rust
/// use troupe_rt::actor::{Actor, ActorContext, ActorError};
/// use troupe_rt::message::{Message, MessageType};
///
/// static JOB_DONE: MessageType = MessageType::new("JobDone");
///
/// struct Supervisor {
///     pending: u32,
/// }
///
/// impl Actor for Supervisor {
///     fn on_receive(
///         &mut self,
///         msg: &Message,
///         ctx: &mut ActorContext<'_>,
///     ) -> Result<(), ActorError> {
///         if msg.is(&JOB_DONE) {
///             self.pending -= 1;
///             if self.pending == 0 {
///                 ctx.stop_self();
///             }
///         }
///         Ok(())
///     }
/// }
/// ```
pub struct ActorContext<'a> {
    cell: &'a ActorCell,
}

impl<'a> ActorContext<'a> {
    pub(crate) fn new(cell: &'a ActorCell) -> Self {
        Self { cell }
    }

    /// Name of the running actor.
    pub fn name(&self) -> &str {
        self.cell.name()
    }

    /// Unique id of the running actor.
    pub fn id(&self) -> ActorId {
        self.cell.id()
    }

    /// A sendable handle to the running actor itself.
    pub fn myself(&self) -> ActorRef {
        ActorRef::from_cell(self.cell)
    }

    /// Number of living children of the running actor.
    ///
    /// During `on_receive` for a `Stopped` report the departed child is
    /// already excluded from this count.
    pub fn num_children(&self) -> usize {
        self.cell.num_children()
    }

    /// Spawn a child actor supervised by the running actor.
    ///
    /// The child's `on_start` runs asynchronously, before any other message
    /// delivered to it. When this actor stops, the child is stopped first.
    pub fn spawn_child(
        &self,
        name: impl Into<String>,
        actor: impl Actor,
    ) -> Result<ActorRef, SpawnError> {
        let child = self.cell.spawn_child(name, Box::new(actor))?;
        Ok(ActorRef::from_cell(&child))
    }

    /// Send a message to another actor, with the running actor as sender.
    ///
    /// `payload` is `None` for payload-free message types. Delivery is
    /// asynchronous; per-recipient FIFO order is preserved for messages
    /// this actor sends.
    pub fn send(
        &self,
        to: &ActorRef,
        message_type: &'static MessageType,
        payload: Option<Box<dyn Any + Send>>,
    ) -> Result<(), SendError> {
        to.deliver(Some(self.myself()), message_type, payload)
    }

    /// Request that this actor stop once the current hook returns.
    ///
    /// Idempotent: any number of calls within one delivery have the same
    /// effect as one. The stop takes the same path as receiving `Stop`:
    /// children are stopped first, then `on_stop` runs.
    pub fn stop_self(&mut self) {
        self.cell.request_stop_self();
    }

    /// Index of the worker this cell is currently assigned to, if any.
    pub fn assigned_worker(&self) -> Option<usize> {
        self.cell.worker_index()
    }
}

impl fmt::Debug for ActorContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActorContext")
            .field("actor", &self.name())
            .finish()
    }
}
