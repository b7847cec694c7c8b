//! Inter-task communication channels
//!
//! Defines the static channels used for communication between Embassy tasks.
//! Uses embassy-sync primitives for safe async communication.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

use herald_protocol::bridge::HostCommand;

/// Channel capacity for commands to the radio coprocessor
const LINK_CHANNEL_SIZE: usize = 8;

/// Commands for the radio coprocessor
///
/// Filled by the engine's collaborators (non-blocking `try_send`) and by the
/// radio RX task (write results); drained by the radio TX task.
pub static LINK_COMMANDS: Channel<CriticalSectionRawMutex, HostCommand, LINK_CHANNEL_SIZE> =
    Channel::new();

/// Signal that the screen state changed and should be redrawn
pub static SCREEN_UPDATE: Signal<CriticalSectionRawMutex, ()> = Signal::new();
