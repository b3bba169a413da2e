//! The actor cell: per-actor state, mailbox, supervision links, and the
//! scheduling handshake.
//!
//! A cell is the unit of scheduling. Parents own their children
//! (`Arc<ActorCell>` in the children list); children keep a non-owning
//! back-reference used only to report `Stopped`. The `idle` flag is the sole
//! scheduling handshake: `idle -> scheduled` when the dispatcher claims the
//! cell, `scheduled -> idle` when a worker finishes a batch.

// Layer 1: Standard library imports
use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicIsize, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

// Layer 2: Third-party crate imports
use parking_lot::Mutex;

// Layer 3: Internal module imports
use super::context::ActorContext;
use super::error::{ActorError, SendError, SpawnError};
use super::lifecycle::{ActorLifecycle, ActorState};
use super::traits::Actor;
use crate::mailbox::{Mailbox, MailboxError};
use crate::message::{Message, MessageType, START, STOP, STOPPED};
use crate::monitoring::{Monitor, RuntimeEvent, RuntimeEventKind};
use crate::scheduler::Dispatcher;
use crate::util::ActorId;

/// Sentinel for a cell not yet assigned to any worker.
const UNASSIGNED_WORKER: isize = -1;

/// Per-cell settings inherited from the system configuration.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CellSettings {
    pub(crate) mailbox_capacity: usize,
    pub(crate) default_affinity: bool,
}

/// Guarded mutable part of a cell: the behavior object and its lifecycle.
///
/// Accessed only by the worker currently draining the cell; the lock is
/// uncontended in steady state.
struct CellState {
    actor: Box<dyn Actor>,
    lifecycle: ActorLifecycle,
}

/// Runtime instance of an actor.
pub(crate) struct ActorCell {
    id: ActorId,
    name: String,
    /// Weak handle to this cell's own allocation, for minting refs and
    /// handing the dispatcher an owning pointer.
    self_ref: Weak<ActorCell>,
    mailbox: Mailbox,
    dispatcher: Arc<Dispatcher>,
    monitor: Arc<dyn Monitor>,
    settings: CellSettings,
    parent: Option<Weak<ActorCell>>,
    children: Mutex<Vec<Arc<ActorCell>>>,
    children_count: AtomicUsize,
    state: Mutex<CellState>,
    /// Scheduling flag: true means not on any runqueue and not being drained.
    idle: AtomicBool,
    /// Mirror of the lifecycle's stopping state, readable without the state lock.
    stopping: AtomicBool,
    stop_self: AtomicBool,
    affinity: bool,
    worker: AtomicIsize,
}

impl ActorCell {
    /// Allocate a cell, link it under `parent`, and schedule delivery of
    /// `Start`, the first message the cell will ever process.
    pub(crate) fn create(
        parent: Option<&ActorCell>,
        name: impl Into<String>,
        actor: Box<dyn Actor>,
        dispatcher: Arc<Dispatcher>,
        monitor: Arc<dyn Monitor>,
        settings: CellSettings,
    ) -> Result<Arc<ActorCell>, SpawnError> {
        let name = name.into();

        if let Some(parent) = parent {
            if parent.is_stopping() {
                return Err(SpawnError::Stopping {
                    parent: parent.name.clone(),
                    child: name,
                });
            }
        }

        let cell = Arc::new_cyclic(|self_ref: &Weak<ActorCell>| ActorCell {
            id: ActorId::new(),
            name,
            self_ref: Weak::clone(self_ref),
            mailbox: Mailbox::new(settings.mailbox_capacity),
            dispatcher,
            monitor: Arc::clone(&monitor),
            settings,
            parent: parent.map(|p| Weak::clone(&p.self_ref)),
            children: Mutex::new(Vec::new()),
            children_count: AtomicUsize::new(0),
            state: Mutex::new(CellState {
                actor,
                lifecycle: ActorLifecycle::new(),
            }),
            idle: AtomicBool::new(true),
            stopping: AtomicBool::new(false),
            stop_self: AtomicBool::new(false),
            affinity: settings.default_affinity,
            worker: AtomicIsize::new(UNASSIGNED_WORKER),
        });

        if let Some(parent) = parent {
            parent.add_child(Arc::clone(&cell));
        }

        monitor.record(RuntimeEvent::new(RuntimeEventKind::ActorSpawned {
            actor: cell.name.clone(),
        }));

        // A fresh mailbox always has room for Start; dispatch failure leaves
        // the cell idle again and the next send retries the handshake.
        let start = Message::new(parent.map(ActorRef::from_cell), &START, None);
        if cell.mailbox.push(start).is_ok() {
            let _ = cell.dispatcher.dispatch(&cell);
        }

        Ok(cell)
    }

    /// Spawn a child cell inheriting this cell's dispatcher and settings.
    pub(crate) fn spawn_child(
        &self,
        name: impl Into<String>,
        actor: Box<dyn Actor>,
    ) -> Result<Arc<ActorCell>, SpawnError> {
        ActorCell::create(
            Some(self),
            name,
            actor,
            Arc::clone(&self.dispatcher),
            Arc::clone(&self.monitor),
            self.settings,
        )
    }

    /// Construct a message, enqueue it for this cell, then ask the
    /// dispatcher to schedule the cell.
    pub(crate) fn deliver(
        &self,
        sender: Option<ActorRef>,
        message_type: &'static MessageType,
        payload: Option<Box<dyn Any + Send>>,
    ) -> Result<(), SendError> {
        let message = Message::new(sender, message_type, payload);
        self.mailbox.push(message).map_err(|err| {
            let MailboxError::Full { capacity } = err;
            SendError::MailboxFull {
                actor: self.name.clone(),
                capacity,
            }
        })?;

        match self.self_ref.upgrade() {
            Some(this) => self.dispatcher.dispatch(&this).map_err(|_| SendError::Busy {
                actor: self.name.clone(),
            }),
            // The cell is in its final teardown; the message dies with the
            // mailbox.
            None => Ok(()),
        }
    }

    /// Pull and handle at most one message.
    ///
    /// Returns `false` iff the cell terminated inside this call; the caller
    /// must not touch the cell again.
    pub(crate) fn process(&self) -> bool {
        match self.mailbox.pull() {
            Some(message) => self.receive(message),
            None => true,
        }
    }

    /// Lifecycle dispatch for one delivered message.
    fn receive(&self, msg: Message) -> bool {
        let mut state = self.state.lock();
        let mut ctx = ActorContext::new(self);

        if msg.is(&START) {
            state.lifecycle.transition_to(ActorState::Running);
            if let Err(err) = state.actor.on_start(&mut ctx) {
                self.record_handler_failure(&err);
                self.stop_self.store(true, Ordering::Release);
            } else {
                self.monitor
                    .record(RuntimeEvent::new(RuntimeEventKind::ActorStarted {
                        actor: self.name.clone(),
                    }));
            }
            if self.stop_self.load(Ordering::Acquire) {
                self.begin_stop(&mut state);
            }
        } else if msg.is(&STOP) {
            self.begin_stop(&mut state);
        } else {
            if msg.is(&STOPPED) {
                // Unlink before the handler runs: the child count the handler
                // observes excludes the departed child, and a stop broadcast
                // triggered below can no longer address it.
                self.reap_child(&msg);
                if let Err(err) = state.actor.on_receive(&msg, &mut ctx) {
                    self.record_handler_failure(&err);
                    self.stop_self.store(true, Ordering::Release);
                }
            } else if state.lifecycle.is_stopping() {
                // No user messages after Stop, only Stopped reports.
                self.monitor
                    .record(RuntimeEvent::new(RuntimeEventKind::MessageDropped {
                        actor: self.name.clone(),
                        message_type: msg.message_type().name(),
                    }));
            } else if let Err(err) = state.actor.on_receive(&msg, &mut ctx) {
                self.record_handler_failure(&err);
                self.stop_self.store(true, Ordering::Release);
            }

            if self.stop_self.load(Ordering::Acquire) {
                self.begin_stop(&mut state);
            }
        }

        if state.lifecycle.state() == ActorState::Stopping
            && self.children_count.load(Ordering::Acquire) == 0
        {
            if let Err(err) = state.actor.on_stop(&mut ctx) {
                self.record_handler_failure(&err);
            }
            state.lifecycle.transition_to(ActorState::Stopped);
            self.monitor
                .record(RuntimeEvent::new(RuntimeEventKind::ActorStopped {
                    actor: self.name.clone(),
                }));

            if let Some(parent) = self.parent.as_ref().and_then(Weak::upgrade) {
                if parent
                    .deliver(Some(ActorRef::from_cell(self)), &STOPPED, None)
                    .is_err()
                {
                    self.monitor
                        .record(RuntimeEvent::new(RuntimeEventKind::MessageDropped {
                            actor: parent.name.clone(),
                            message_type: STOPPED.name(),
                        }));
                }
            }
            return false;
        }

        true
    }

    /// Enter the Stopping state and broadcast `Stop` to every child.
    ///
    /// A repeat `Stop` (or a latched self-stop racing one) is a no-op and
    /// does not re-broadcast.
    fn begin_stop(&self, state: &mut CellState) {
        if state.lifecycle.is_stopping() {
            return;
        }
        state.lifecycle.transition_to(ActorState::Stopping);
        self.stopping.store(true, Ordering::Release);
        self.monitor
            .record(RuntimeEvent::new(RuntimeEventKind::ActorStopping {
                actor: self.name.clone(),
            }));

        // Snapshot: holding the children lock across sends is unnecessary,
        // and no child can be added once `stopping` is visible.
        let children: Vec<Arc<ActorCell>> = self.children.lock().to_vec();
        for child in children {
            if child
                .deliver(Some(ActorRef::from_cell(self)), &STOP, None)
                .is_err()
            {
                self.monitor
                    .record(RuntimeEvent::new(RuntimeEventKind::MessageDropped {
                        actor: child.name.clone(),
                        message_type: STOP.name(),
                    }));
            }
        }
    }

    /// Unlink the child that sent this `Stopped` report, releasing the
    /// owning handle. A report from an unknown sender is ignored.
    fn reap_child(&self, msg: &Message) {
        let Some(sender) = msg.sender() else {
            return;
        };
        let child = {
            let mut children = self.children.lock();
            match children.iter().position(|c| c.id == sender.id()) {
                Some(index) => {
                    self.children_count.fetch_sub(1, Ordering::AcqRel);
                    Some(children.remove(index))
                }
                None => None,
            }
        };
        if let Some(child) = child {
            self.monitor
                .record(RuntimeEvent::new(RuntimeEventKind::ChildReaped {
                    parent: self.name.clone(),
                    child: child.name.clone(),
                }));
        }
    }

    fn add_child(&self, child: Arc<ActorCell>) {
        self.children.lock().push(child);
        self.children_count.fetch_add(1, Ordering::AcqRel);
    }

    fn record_handler_failure(&self, err: &ActorError) {
        self.monitor
            .record(RuntimeEvent::new(RuntimeEventKind::HandlerFailed {
                actor: self.name.clone(),
                error: err.to_string(),
            }));
    }

    /// Latch a self-stop request; honored at the end of the current delivery.
    pub(crate) fn request_stop_self(&self) {
        self.stop_self.store(true, Ordering::Release);
    }

    /// Claim the cell for scheduling (CAS `idle` true -> false).
    pub(crate) fn set_scheduled(&self) -> bool {
        self.idle
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Release the cell after a batch (CAS `idle` false -> true).
    pub(crate) fn set_idle(&self) -> bool {
        self.idle
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub(crate) fn mailbox_is_empty(&self) -> bool {
        self.mailbox.is_empty()
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn id(&self) -> ActorId {
        self.id
    }

    pub(crate) fn affinity(&self) -> bool {
        self.affinity
    }

    pub(crate) fn worker_index(&self) -> Option<usize> {
        let index = self.worker.load(Ordering::Acquire);
        usize::try_from(index).ok()
    }

    pub(crate) fn set_worker(&self, index: usize) {
        self.worker.store(index as isize, Ordering::Release);
    }

    pub(crate) fn num_children(&self) -> usize {
        self.children_count.load(Ordering::Acquire)
    }

    pub(crate) fn is_stopping(&self) -> bool {
        self.stopping.load(Ordering::Acquire)
    }

    pub(crate) fn children_snapshot(&self) -> Vec<Arc<ActorCell>> {
        self.children.lock().to_vec()
    }
}

impl fmt::Debug for ActorCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActorCell")
            .field("name", &self.name)
            .field("id", &self.id)
            .field("idle", &self.idle.load(Ordering::Relaxed))
            .field("children", &self.children_count.load(Ordering::Relaxed))
            .finish()
    }
}

/// Non-owning handle to an actor cell.
///
/// Refs are cheap to clone and safe to hold after the actor has stopped;
/// sending to a stopped actor fails with [`SendError::ActorStopped`].
/// Equality and hashing are by actor id.
#[derive(Clone)]
pub struct ActorRef {
    cell: Weak<ActorCell>,
    id: ActorId,
    name: Arc<str>,
}

impl ActorRef {
    pub(crate) fn from_cell(cell: &ActorCell) -> Self {
        Self {
            cell: Weak::clone(&cell.self_ref),
            id: cell.id,
            name: Arc::from(cell.name.as_str()),
        }
    }

    /// Unique id of the referenced actor.
    pub fn id(&self) -> ActorId {
        self.id
    }

    /// Name the actor was created with.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// True while the referenced cell is still allocated.
    pub fn is_alive(&self) -> bool {
        self.cell.strong_count() > 0
    }

    /// Index of the worker the cell is currently assigned to, if any.
    ///
    /// Exposed so affinity is observable; pinned cells keep the same index
    /// for their whole lifetime once assigned.
    pub fn assigned_worker(&self) -> Option<usize> {
        self.cell.upgrade().and_then(|cell| cell.worker_index())
    }

    pub(crate) fn deliver(
        &self,
        sender: Option<ActorRef>,
        message_type: &'static MessageType,
        payload: Option<Box<dyn Any + Send>>,
    ) -> Result<(), SendError> {
        let cell = self.cell.upgrade().ok_or_else(|| SendError::ActorStopped {
            actor: self.name.to_string(),
        })?;
        cell.deliver(sender, message_type, payload)
    }
}

impl PartialEq for ActorRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ActorRef {}

impl std::hash::Hash for ActorRef {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ActorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ActorRef({}@{})", self.name, self.id)
    }
}
