//! Connection and pairing
//!
//! [`ConnectionState::transition`] is the pure state machine. [`Link`] owns
//! the current state together with the pairing session and performs the side
//! effects each transition implies.

pub mod connection;
pub mod events;
pub mod machine;
pub mod pairing;

pub use connection::{Link, LinkError};
pub use events::LinkEvent;
pub use machine::{ConnectionState, ConnectionStatus, SecurityLevel};
pub use pairing::{Passkey, PairingError, PairingSession};
