//! Board-agnostic core logic for the Herald notification receiver
//!
//! This crate contains everything that does not depend on a particular radio
//! stack or board:
//!
//! - Connection and pairing state machine
//! - Bounded notification store with timed, undoable deletion
//! - Relative time and clock formatting
//! - Collaborator traits (display, pairing UI, clock, error reporting, link control)
//! - The engine tying the above to the wire protocol, and its shared wrapper
//! - Configuration types and postcard persistence

#![no_std]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod config;
pub mod engine;
pub mod link;
pub mod store;
pub mod time;
pub mod traits;

#[cfg(test)]
mod testing;

pub use engine::{Engine, SharedEngine, TransportEvent, UserAction, WriteError};
