//! Collaborator traits
//!
//! These traits define the interface between the protocol engine and the
//! board: the radio stack, the screen, the clock and whatever records errors.
//! Implementations must not block; the engine calls them while it holds the
//! shared lock.

pub mod clock;
pub mod display;
pub mod link;
pub mod pairing;
pub mod report;

pub use clock::{Clock, ClockError};
pub use display::NotificationDisplay;
pub use link::LinkControl;
pub use pairing::PairingUi;
pub use report::ErrorReporter;

/// Everything the engine needs from its surroundings
///
/// Implemented automatically for any type providing all collaborator traits.
pub trait Collaborators:
    Clock + NotificationDisplay + PairingUi + ErrorReporter + LinkControl
{
}

impl<T> Collaborators for T where
    T: Clock + NotificationDisplay + PairingUi + ErrorReporter + LinkControl
{
}
