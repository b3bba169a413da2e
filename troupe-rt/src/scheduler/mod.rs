//! Cooperative scheduling: workers and the dispatcher.
//!
//! Runnable cells are handed to a fixed pool of worker threads. The
//! dispatcher claims a cell through the `idle` CAS handshake and places it
//! on one worker's runqueue; the worker drains it in a bounded batch and
//! either re-schedules it (mailbox still non-empty) or returns it to idle.

pub(crate) mod dispatcher;
pub(crate) mod worker;

pub(crate) use dispatcher::Dispatcher;
pub(crate) use worker::WorkerSettings;
