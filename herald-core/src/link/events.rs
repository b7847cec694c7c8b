//! Events that trigger link state transitions

/// Events that can change the connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkEvent {
    // Advertising
    /// Advertising started
    StartAdvertising,
    /// Advertising stopped without a connection
    StopAdvertising,

    // Connection lifecycle
    /// Transport reports a new connection
    LinkEstablished,
    /// Transport reports the connection attempt failed
    LinkFailed,
    /// Link is gone, for whatever reason
    Disconnected,

    // Security
    /// Encryption reached at least the required level
    SecurityUpgraded,
    /// Encryption is up but below the required level
    SecurityPartial,
    /// Pairing handshake completed successfully
    PairingComplete,
}
