//! Message type descriptors with process-stable dense ids.

// Layer 1: Standard library imports
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
use super::registry::MessageTypeRegistry;

/// Process-wide counter handing out dense message-type ids.
static NEXT_MESSAGE_TYPE_ID: AtomicUsize = AtomicUsize::new(0);

/// Dense integer id assigned to a [`MessageType`] at registration.
///
/// Ids start at zero and are stable for the lifetime of the process, which
/// makes them suitable as indices into user-maintained dispatch tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageTypeId(usize);

impl MessageTypeId {
    /// The id as a plain index.
    pub fn as_usize(self) -> usize {
        self.0
    }

    #[cfg(test)]
    pub(crate) fn from_raw_for_test(raw: usize) -> Self {
        Self(raw)
    }
}

impl fmt::Display for MessageTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Static descriptor of a message type.
///
/// Message types are declared as `static` items and identified by reference,
/// so two messages have the same type exactly when they point at the same
/// descriptor. A dense [`MessageTypeId`] is assigned on first registration
/// and never changes; registration is initialize-once and safe to race from
/// any number of threads.
///
/// # Examples
/// ```rust
/// use troupe_rt::message::MessageType;
///
/// static PRICE_CHANGED: MessageType = MessageType::new("PriceChanged");
///
/// let id = PRICE_CHANGED.register();
/// assert_eq!(PRICE_CHANGED.id(), id); // stable for the process lifetime
/// assert_eq!(PRICE_CHANGED.name(), "PriceChanged");
/// ```
#[derive(Debug)]
pub struct MessageType {
    name: &'static str,
    id: OnceLock<MessageTypeId>,
}

impl MessageType {
    /// Declare a new message type with the given display name.
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            id: OnceLock::new(),
        }
    }

    /// Display name of the type.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Register this type, assigning its dense id on the first call.
    ///
    /// Subsequent calls (from any thread) return the same id. Registration
    /// also publishes the descriptor in the global [`MessageTypeRegistry`].
    pub fn register(&'static self) -> MessageTypeId {
        *self.id.get_or_init(|| {
            let id = MessageTypeId(NEXT_MESSAGE_TYPE_ID.fetch_add(1, Ordering::Relaxed));
            MessageTypeRegistry::global().insert(id, self);
            id
        })
    }

    /// The dense id of this type, registering it on first use.
    pub fn id(&'static self) -> MessageTypeId {
        self.register()
    }
}

/// Lifecycle message delivered first to every cell; dispatched to `on_start`.
pub static START: MessageType = MessageType::new("Start");

/// Lifecycle message requesting a graceful stop; broadcast to children.
pub static STOP: MessageType = MessageType::new("Stop");

/// Lifecycle message a stopped cell sends to its parent.
pub static STOPPED: MessageType = MessageType::new("Stopped");
