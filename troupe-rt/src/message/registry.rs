//! Global registry of message types by dense id.

// Layer 1: Standard library imports
use std::sync::OnceLock;

// Layer 2: Third-party crate imports
use dashmap::DashMap;

// Layer 3: Internal module imports
use super::types::{MessageType, MessageTypeId};

/// Process-wide registry mapping dense ids back to their descriptors.
///
/// Populated automatically when a [`MessageType`] registers itself; useful
/// for dispatch-table diagnostics ("what type does id 7 belong to?").
///
/// # Examples
/// ```rust
/// use troupe_rt::message::{MessageType, MessageTypeRegistry};
///
/// static ORDER_PLACED: MessageType = MessageType::new("OrderPlaced");
///
/// let id = ORDER_PLACED.register();
/// let found = MessageTypeRegistry::global().lookup(id);
/// assert_eq!(found.map(|t| t.name()), Some("OrderPlaced"));
/// ```
#[derive(Debug)]
pub struct MessageTypeRegistry {
    by_id: DashMap<MessageTypeId, &'static MessageType>,
}

static GLOBAL_REGISTRY: OnceLock<MessageTypeRegistry> = OnceLock::new();

impl MessageTypeRegistry {
    /// The process-wide registry instance.
    pub fn global() -> &'static MessageTypeRegistry {
        GLOBAL_REGISTRY.get_or_init(|| MessageTypeRegistry {
            by_id: DashMap::new(),
        })
    }

    /// Look up a registered descriptor by its dense id.
    pub fn lookup(&self, id: MessageTypeId) -> Option<&'static MessageType> {
        self.by_id.get(&id).map(|entry| *entry.value())
    }

    /// Number of registered message types.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// True if no message type has been registered yet.
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub(crate) fn insert(&self, id: MessageTypeId, message_type: &'static MessageType) {
        self.by_id.insert(id, message_type);
    }
}
