//! The core Actor trait.
//!
//! An actor is an isolated unit of state that reacts to messages delivered
//! one at a time. The implementing struct carries both the actor's creation
//! parameters and its private state; the runtime never touches either except
//! through the three lifecycle hooks below, and never from more than one
//! thread at a time.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
use super::context::ActorContext;
use super::error::ActorError;
use crate::message::Message;

/// Behavior of an actor: three lifecycle hooks invoked by the runtime.
///
/// # Execution model
///
/// For any one cell, `on_start`, `on_receive`, and `on_stop` are never
/// concurrent with each other nor with themselves; across cells they run
/// fully in parallel. A hook runs to completion without preemption, so
/// blocking inside a handler starves the worker executing it.
///
/// # Hook ordering
///
/// - `on_start` runs exactly once, before any other delivery.
/// - `on_receive` runs once per user message while the actor is running,
///   and for each `Stopped` report from a terminating child.
/// - `on_stop` runs at most once, after the actor has stopped all of its
///   children; the cell is released afterwards.
///
/// Returning `Err` from any hook records the failure and stops the actor;
/// the runtime does not restart faulted actors.
///
/// # Examples
///
/// ```rust
/// use troupe_rt::actor::{Actor, ActorContext, ActorError};
/// use troupe_rt::message::{Message, MessageType};
///
/// static GREET: MessageType = MessageType::new("Greet");
///
/// struct Greeter {
///     greeted: u32,
/// }
///
/// impl Actor for Greeter {
///     fn on_receive(
///         &mut self,
///         msg: &Message,
///         _ctx: &mut ActorContext<'_>,
///     ) -> Result<(), ActorError> {
///         if msg.is(&GREET) {
///             self.greeted += 1;
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Actor: Send + 'static {
    /// Hook invoked once, when the cell receives its initial `Start`
    /// message. Spawn children and send initial messages from here.
    ///
    /// Default implementation does nothing.
    fn on_start(&mut self, _ctx: &mut ActorContext<'_>) -> Result<(), ActorError> {
        Ok(())
    }

    /// Hook invoked for every delivered message except `Start` and `Stop`.
    ///
    /// `Stopped` reports from terminating children also arrive here (after
    /// the runtime has already unlinked the child), so supervisors can
    /// account for departures.
    fn on_receive(&mut self, msg: &Message, ctx: &mut ActorContext<'_>) -> Result<(), ActorError>;

    /// Hook invoked once when the actor stops, after all of its children
    /// have stopped. Release external resources here.
    ///
    /// Default implementation does nothing.
    fn on_stop(&mut self, _ctx: &mut ActorContext<'_>) -> Result<(), ActorError> {
        Ok(())
    }
}
