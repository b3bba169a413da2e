//! Message types, registration, and envelopes.
//!
//! Messages in this runtime are dynamically typed: each carries a reference
//! to a process-wide static [`MessageType`] descriptor plus an optional boxed
//! payload. The reserved [`START`], [`STOP`], and [`STOPPED`] types drive the
//! actor lifecycle; everything else is user-defined.

pub mod envelope;
pub mod registry;
pub mod types;

pub use envelope::Message;
pub use registry::MessageTypeRegistry;
pub use types::{MessageType, MessageTypeId, START, STOP, STOPPED};
