//! Notification display trait

use crate::link::ConnectionStatus;
use crate::store::NotificationStore;

/// Trait for the notification screen
///
/// The engine only publishes state; layout and rendering stay with the
/// implementation.
pub trait NotificationDisplay {
    /// Connection status changed
    fn on_connection_status_changed(&mut self, status: ConnectionStatus);

    /// Clock text changed (`"HH:MM"` or `"--:--"`)
    fn on_time_changed(&mut self, time: &str);

    /// Store contents, cursor or pending deletion changed
    ///
    /// Also called periodically so relative timestamps re-render.
    fn on_store_changed<const N: usize>(&mut self, store: &NotificationStore<N>);
}
