//! The message value exchanged between cells.

// Layer 1: Standard library imports
use std::any::Any;
use std::fmt;

// Layer 2: Third-party crate imports
use chrono::{DateTime, Utc};

// Layer 3: Internal module imports
use super::types::MessageType;
use crate::actor::ActorRef;

/// A single message in flight.
///
/// Messages are allocated when sent and consumed by the receiving worker
/// after the handler returns. Each carries its [`MessageType`], an optional
/// payload (any `Send` value, retrieved by downcast), the sending actor
/// (`None` for messages of external or system origin), and a creation
/// timestamp.
///
/// Type identity is by descriptor reference: [`Message::is`] compares
/// against the `static` the message was sent with.
pub struct Message {
    message_type: &'static MessageType,
    payload: Option<Box<dyn Any + Send>>,
    sender: Option<ActorRef>,
    timestamp: DateTime<Utc>,
}

impl Message {
    pub(crate) fn new(
        sender: Option<ActorRef>,
        message_type: &'static MessageType,
        payload: Option<Box<dyn Any + Send>>,
    ) -> Self {
        message_type.register();
        Self {
            message_type,
            payload,
            sender,
            timestamp: Utc::now(),
        }
    }

    /// The descriptor this message was sent with.
    pub fn message_type(&self) -> &'static MessageType {
        self.message_type
    }

    /// True if this message is of the given type (descriptor identity).
    pub fn is(&self, message_type: &'static MessageType) -> bool {
        std::ptr::eq(self.message_type, message_type)
    }

    /// The payload, downcast to `T`.
    ///
    /// Returns `None` for payload-free messages and for a mismatched `T`.
    pub fn payload<T: Any>(&self) -> Option<&T> {
        self.payload.as_ref().and_then(|p| p.downcast_ref::<T>())
    }

    /// The sending actor, or `None` for external/system origins.
    pub fn sender(&self) -> Option<&ActorRef> {
        self.sender.as_ref()
    }

    /// When the message was created.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Message")
            .field("type", &self.message_type.name())
            .field("has_payload", &self.payload.is_some())
            .field("sender", &self.sender.as_ref().map(|s| s.name().to_string()))
            .field("timestamp", &self.timestamp)
            .finish()
    }
}
