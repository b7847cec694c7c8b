//! Pairing screen trait

use crate::link::Passkey;

/// Trait for the passkey prompt
pub trait PairingUi {
    /// Show the passkey the user must compare with the peer
    fn show_passkey(&mut self, passkey: Passkey);

    /// Remove the passkey prompt (no-op if not shown)
    fn hide_passkey(&mut self);
}
