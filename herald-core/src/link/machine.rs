//! Connection state machine definition

use super::events::LinkEvent;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Connection states of the single peer link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConnectionState {
    /// No link, not advertising
    #[default]
    Disconnected,
    /// Waiting for the peer to connect
    Advertising,
    /// Link up, security requested
    Connecting,
    /// Link encrypted below the required level
    Connected,
    /// Link secured; commands are accepted
    Paired,
}

/// Connection status as shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConnectionStatus {
    Connected,
    WeakSignal,
    Connecting,
    Disconnected,
}

impl ConnectionStatus {
    /// Short label for the status bar
    pub fn label(&self) -> &'static str {
        match self {
            ConnectionStatus::Connected => "Connected",
            ConnectionStatus::WeakSignal => "Weak signal",
            ConnectionStatus::Connecting => "Connecting",
            ConnectionStatus::Disconnected => "Disconnected",
        }
    }
}

/// Link security level, ordered from weakest to strongest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SecurityLevel {
    /// No encryption
    #[default]
    L1,
    /// Encryption without authentication
    L2,
    /// Authenticated encryption
    L3,
    /// Authenticated LE Secure Connections
    L4,
}

impl SecurityLevel {
    /// Parse a numeric level (1-4)
    pub fn from_u8(level: u8) -> Option<Self> {
        match level {
            1 => Some(SecurityLevel::L1),
            2 => Some(SecurityLevel::L2),
            3 => Some(SecurityLevel::L3),
            4 => Some(SecurityLevel::L4),
            _ => None,
        }
    }

    pub fn as_u8(&self) -> u8 {
        match self {
            SecurityLevel::L1 => 1,
            SecurityLevel::L2 => 2,
            SecurityLevel::L3 => 3,
            SecurityLevel::L4 => 4,
        }
    }
}

impl ConnectionState {
    /// Check if a peer link exists in this state
    pub fn has_peer(&self) -> bool {
        matches!(
            self,
            ConnectionState::Connecting | ConnectionState::Connected | ConnectionState::Paired
        )
    }

    /// Check if commands from the peer may be executed
    pub fn accepts_commands(&self) -> bool {
        matches!(self, ConnectionState::Paired)
    }

    /// Display status for this state, before signal strength is considered
    pub fn status(&self) -> ConnectionStatus {
        match self {
            ConnectionState::Disconnected | ConnectionState::Advertising => {
                ConnectionStatus::Disconnected
            }
            ConnectionState::Connecting | ConnectionState::Connected => {
                ConnectionStatus::Connecting
            }
            ConnectionState::Paired => ConnectionStatus::Connected,
        }
    }

    /// Process an event and return the next state
    pub fn transition(self, event: LinkEvent) -> Self {
        use ConnectionState::*;
        use LinkEvent as E;

        match (self, event) {
            // A dropped link always ends in Disconnected
            (_, E::Disconnected) => Disconnected,

            // Advertising
            (Disconnected, E::StartAdvertising) => Advertising,
            (Advertising, E::StartAdvertising) => Advertising,
            (Advertising, E::StopAdvertising) => Disconnected,

            // Connection setup
            (Disconnected | Advertising, E::LinkEstablished) => Connecting,
            (Advertising | Connecting, E::LinkFailed) => Disconnected,

            // Security
            (Connecting | Connected, E::SecurityUpgraded) => Paired,
            (Connecting, E::SecurityPartial) => Connected,
            (Connecting | Connected, E::PairingComplete) => Paired,

            // Invalid transitions - stay in current state
            _ => self,
        }
    }
}
