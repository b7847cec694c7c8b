//! Notification store
//!
//! A bounded, ordered list of notifications with a cursor and at most one
//! pending (undoable) deletion.

pub mod inbox;
pub mod notification;

pub use inbox::{NotificationStore, PendingDeletion, StoreError, STORE_CAPACITY};
pub use notification::Notification;
