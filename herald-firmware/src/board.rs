//! Board collaborators
//!
//! [`BoardHooks`] is what the engine talks to on this board: the radio
//! coprocessor (through [`LINK_COMMANDS`]), a software clock, the screen
//! state read by the screen task, and error counters.
//!
//! Every method here runs with the engine lock held, so nothing may await or
//! block. Radio commands are queued with `try_send`; screen changes only
//! update [`Screen`] and raise [`SCREEN_UPDATE`].

use defmt::*;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_time::Instant;
use portable_atomic::{AtomicU32, Ordering};

use herald_core::link::{ConnectionStatus, LinkError, Passkey, SecurityLevel};
use herald_core::store::{Notification, NotificationStore};
use herald_core::time::ClockText;
use herald_core::traits::{Clock, ClockError, ErrorReporter, LinkControl, NotificationDisplay, PairingUi};
use herald_core::SharedEngine;
use herald_protocol::bridge::HostCommand;
use herald_protocol::clamped;

use crate::channels::{LINK_COMMANDS, SCREEN_UPDATE};

/// The engine as shared between tasks on this board
pub type HeraldEngine = SharedEngine<CriticalSectionRawMutex, BoardHooks>;

static MALFORMED_PACKETS: AtomicU32 = AtomicU32::new(0);
static DROPPED_CONNECTIONS: AtomicU32 = AtomicU32::new(0);
static BUFFER_OVERFLOWS: AtomicU32 = AtomicU32::new(0);
static SECURITY_FAILURES: AtomicU32 = AtomicU32::new(0);
static REJECTED_WRITES: AtomicU32 = AtomicU32::new(0);
static CLOCK_FAILURES: AtomicU32 = AtomicU32::new(0);

/// Log the error counters (called periodically from main)
pub fn log_error_counts() {
    debug!(
        "Errors: malformed={} dropped={} overflow={} security={} rejected={} clock={}",
        MALFORMED_PACKETS.load(Ordering::Relaxed),
        DROPPED_CONNECTIONS.load(Ordering::Relaxed),
        BUFFER_OVERFLOWS.load(Ordering::Relaxed),
        SECURITY_FAILURES.load(Ordering::Relaxed),
        REJECTED_WRITES.load(Ordering::Relaxed),
        CLOCK_FAILURES.load(Ordering::Relaxed),
    );
}

/// What the screen shows, as last published by the engine
#[derive(Debug, Clone)]
pub struct Screen {
    pub status: ConnectionStatus,
    pub clock: ClockText,
    pub passkey: Option<Passkey>,
    /// 1-based position and total, `None` when empty
    pub position: Option<(usize, usize)>,
    pub unread: usize,
    pub current: Option<Notification>,
    pub deleting: bool,
}

impl Screen {
    const fn new() -> Self {
        Self {
            status: ConnectionStatus::Disconnected,
            clock: ClockText::new(),
            passkey: None,
            position: None,
            unread: 0,
            current: None,
            deleting: false,
        }
    }
}

/// Wall clock set by the phone, advanced by the embassy time driver
#[derive(Debug, Clone, Copy)]
struct ClockBase {
    unix: u32,
    at: Instant,
}

pub struct BoardHooks {
    clock: Option<ClockBase>,
    screen: Screen,
}

impl BoardHooks {
    pub const fn new() -> Self {
        Self {
            clock: None,
            screen: Screen::new(),
        }
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    fn queue(&mut self, cmd: HostCommand) -> Result<(), LinkError> {
        LINK_COMMANDS.try_send(cmd).map_err(|_| {
            warn!("Link command queue full, dropping {:?}", cmd);
            LinkError::Transport
        })
    }
}

impl Clock for BoardHooks {
    fn set_time(&mut self, unix_timestamp: u32) -> Result<(), ClockError> {
        self.clock = Some(ClockBase {
            unix: unix_timestamp,
            at: Instant::now(),
        });
        Ok(())
    }

    fn now(&self) -> Option<u32> {
        let base = self.clock?;
        let elapsed = u32::try_from(base.at.elapsed().as_secs()).ok()?;
        base.unix.checked_add(elapsed)
    }
}

impl LinkControl for BoardHooks {
    fn start_advertising(&mut self) -> Result<(), LinkError> {
        self.queue(HostCommand::StartAdvertising)
    }

    fn stop_advertising(&mut self) -> Result<(), LinkError> {
        self.queue(HostCommand::StopAdvertising)
    }

    fn request_security(&mut self, level: SecurityLevel) -> Result<(), LinkError> {
        self.queue(HostCommand::RequestSecurity {
            level: level.as_u8(),
        })
    }

    fn confirm_passkey(&mut self) -> Result<(), LinkError> {
        self.queue(HostCommand::ConfirmPasskey)
    }

    fn cancel_passkey(&mut self) -> Result<(), LinkError> {
        self.queue(HostCommand::CancelPasskey)
    }

    fn disconnect(&mut self) -> Result<(), LinkError> {
        self.queue(HostCommand::Disconnect)
    }
}

impl NotificationDisplay for BoardHooks {
    fn on_connection_status_changed(&mut self, status: ConnectionStatus) {
        self.screen.status = status;
        SCREEN_UPDATE.signal(());
    }

    fn on_time_changed(&mut self, time: &str) {
        self.screen.clock = clamped(time);
        SCREEN_UPDATE.signal(());
    }

    fn on_store_changed<const N: usize>(&mut self, store: &NotificationStore<N>) {
        self.screen.position = store.position();
        self.screen.unread = store.unread_count();
        self.screen.current = store.current().cloned();
        self.screen.deleting = store.is_deletion_pending();
        SCREEN_UPDATE.signal(());
    }
}

impl PairingUi for BoardHooks {
    fn show_passkey(&mut self, passkey: Passkey) {
        self.screen.passkey = Some(passkey);
        SCREEN_UPDATE.signal(());
    }

    fn hide_passkey(&mut self) {
        self.screen.passkey = None;
        SCREEN_UPDATE.signal(());
    }
}

impl ErrorReporter for BoardHooks {
    fn malformed_packet(&mut self, reason: &'static str) {
        MALFORMED_PACKETS.fetch_add(1, Ordering::Relaxed);
        warn!("Malformed packet: {}", reason);
    }

    fn connection_dropped(&mut self, reason: &'static str) {
        DROPPED_CONNECTIONS.fetch_add(1, Ordering::Relaxed);
        info!("Connection dropped: {}", reason);
    }

    fn buffer_overflow(&mut self, reason: &'static str) {
        BUFFER_OVERFLOWS.fetch_add(1, Ordering::Relaxed);
        error!("Buffer overflow: {}", reason);
    }

    fn security_failure(&mut self, reason: &'static str) {
        SECURITY_FAILURES.fetch_add(1, Ordering::Relaxed);
        warn!("Security failure: {}", reason);
    }

    fn write_rejected(&mut self, reason: &'static str) {
        REJECTED_WRITES.fetch_add(1, Ordering::Relaxed);
        warn!("Write rejected: {}", reason);
    }

    fn clock_failure(&mut self, reason: &'static str) {
        CLOCK_FAILURES.fetch_add(1, Ordering::Relaxed);
        error!("Clock not set: {}", reason);
    }
}
