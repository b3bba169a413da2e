//! Per-cell message queuing.

pub mod bounded;

pub use bounded::{Mailbox, MailboxError};
