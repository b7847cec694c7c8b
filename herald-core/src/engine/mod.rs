//! Protocol engine
//!
//! [`Engine`] owns the reassembler, link, store and collaborators, and is
//! the only place transport events, user actions and ticks enter the core.
//! [`SharedEngine`] puts it behind one lock so the transport callbacks and the
//! periodic task can share it.

pub mod receiver;
pub mod shared;

pub use receiver::{ActionError, Engine, EventError, TransportEvent, UserAction, WriteError};
pub use shared::SharedEngine;
