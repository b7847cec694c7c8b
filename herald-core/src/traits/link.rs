//! Radio stack control trait

use crate::link::{LinkError, SecurityLevel};

/// Commands from the engine back to the wireless transport
///
/// Each call only requests the action; outcomes arrive later as transport
/// events (`on_connected`, `on_disconnected`, ...).
pub trait LinkControl {
    /// Start connectable advertising
    fn start_advertising(&mut self) -> Result<(), LinkError>;

    /// Stop advertising
    fn stop_advertising(&mut self) -> Result<(), LinkError>;

    /// Ask the peer link to reach `level`
    fn request_security(&mut self, level: SecurityLevel) -> Result<(), LinkError>;

    /// User accepted the displayed passkey
    fn confirm_passkey(&mut self) -> Result<(), LinkError>;

    /// User rejected the displayed passkey
    fn cancel_passkey(&mut self) -> Result<(), LinkError>;

    /// Drop the peer link
    fn disconnect(&mut self) -> Result<(), LinkError>;
}
