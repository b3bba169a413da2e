//! Bounded MPSC mailbox.

// Layer 1: Standard library imports
use std::collections::VecDeque;

// Layer 2: Third-party crate imports
use parking_lot::Mutex;
use thiserror::Error;

// Layer 3: Internal module imports
use crate::message::Message;

/// Errors raised by mailbox operations.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailboxError {
    /// The mailbox is at capacity; the message was not queued.
    #[error("mailbox full (capacity {capacity})")]
    Full {
        /// Configured capacity of the rejecting mailbox
        capacity: usize,
    },
}

/// Bounded FIFO mailbox attached to each actor cell.
///
/// Many senders push concurrently under the queue lock; exactly one worker
/// pulls at a time (the scheduling handshake guarantees a single consumer,
/// so per-sender FIFO order is preserved end to end). A full mailbox rejects
/// the push with [`MailboxError::Full`]; a message accepted by `push` is
/// never silently dropped.
pub struct Mailbox {
    queue: Mutex<VecDeque<Message>>,
    capacity: usize,
}

impl Mailbox {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            capacity,
        }
    }

    /// Configured capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current queue depth.
    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    /// True if no messages are queued.
    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }

    pub(crate) fn push(&self, message: Message) -> Result<(), MailboxError> {
        let mut queue = self.queue.lock();
        if queue.len() >= self.capacity {
            return Err(MailboxError::Full {
                capacity: self.capacity,
            });
        }
        queue.push_back(message);
        Ok(())
    }

    pub(crate) fn pull(&self) -> Option<Message> {
        self.queue.lock().pop_front()
    }
}

impl std::fmt::Debug for Mailbox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mailbox")
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .finish()
    }
}
