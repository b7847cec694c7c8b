//! Engine: transport events, user actions and the periodic tick

use herald_protocol::{Command, Framing, OverflowError, Reassembler};

use crate::config::{EngineConfig, OverflowPolicy};
use crate::link::{
    ConnectionState, ConnectionStatus, Link, LinkError, Passkey, PairingError, SecurityLevel,
};
use crate::store::{NotificationStore, StoreError, STORE_CAPACITY};
use crate::time::{format_clock, format_relative, RelativeText};
use crate::traits::Collaborators;

/// Write rejected by the engine
///
/// The transport adapter answers the peer with an ATT error for these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WriteError {
    /// Link has not reached the required security level
    NotSecured,
    /// Write would run past the assembly buffer
    Overflow(OverflowError),
}

impl From<OverflowError> for WriteError {
    fn from(e: OverflowError) -> Self {
        WriteError::Overflow(e)
    }
}

/// Error from [`Engine::handle_transport`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EventError {
    Write(WriteError),
    Pairing(PairingError),
}

impl From<WriteError> for EventError {
    fn from(e: WriteError) -> Self {
        EventError::Write(e)
    }
}

impl From<PairingError> for EventError {
    fn from(e: PairingError) -> Self {
        EventError::Pairing(e)
    }
}

/// Error from [`Engine::handle_action`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ActionError {
    Pairing(PairingError),
    Store(StoreError),
}

impl From<PairingError> for ActionError {
    fn from(e: PairingError) -> Self {
        ActionError::Pairing(e)
    }
}

impl From<StoreError> for ActionError {
    fn from(e: StoreError) -> Self {
        ActionError::Store(e)
    }
}

/// Events delivered by the wireless transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportEvent<'a> {
    /// Characteristic write at a byte offset
    Write { offset: u32, data: &'a [u8] },
    /// Connection attempt finished; `Err` carries the transport status code
    Connected(Result<(), u8>),
    Disconnected { reason: u8 },
    SecurityChanged {
        level: SecurityLevel,
        result: Result<(), u8>,
    },
    /// Passkey to display or confirm
    PasskeyRequested(u32),
    PairingCancelled,
    PairingComplete { bonded: bool },
    PairingFailed { reason: u8 },
    /// Signal strength of the peer link in dBm
    Rssi(i8),
}

/// Logical user actions, already interpreted from touch or buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UserAction {
    /// Next notification
    Advance,
    /// Previous notification
    GoBack,
    /// Start deleting the current notification
    RequestDelete,
    /// Mark the current notification read
    MarkRead,
    /// Accept the passkey
    Confirm,
    /// Reject the passkey, or undo a pending deletion
    Cancel,
}

/// The notification receiver engine
pub struct Engine<H: Collaborators, const N: usize = STORE_CAPACITY> {
    config: EngineConfig,
    framing: Reassembler,
    link: Link,
    store: NotificationStore<N>,
    hooks: H,
    /// Ticks since the last accepted write while data is buffered
    idle_ticks: u8,
    clock_ticks: u32,
    refresh_ticks: u32,
}

impl<H: Collaborators, const N: usize> Engine<H, N> {
    pub fn new(config: EngineConfig, hooks: H) -> Self {
        Self {
            framing: Reassembler::new(),
            link: Link::new(config.required_security, config.weak_signal_rssi_dbm),
            store: NotificationStore::new(config.delete_timeout_ticks, config.delete_preview),
            hooks,
            idle_ticks: 0,
            clock_ticks: 0,
            refresh_ticks: 0,
            config,
        }
    }

    /// Start advertising and publish the initial screen state
    pub fn start(&mut self) -> Result<(), LinkError> {
        info!("Engine starting");
        let result = self.link.start_advertising(&mut self.hooks);
        if let Err(e) = result {
            error!("Failed to start advertising: {}", e.reason());
            self.link.publish_status(&mut self.hooks);
        }
        self.publish_time();
        self.hooks.on_store_changed(&self.store);
        result
    }

    // --- Accessors ---

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn link(&self) -> &Link {
        &self.link
    }

    pub fn store(&self) -> &NotificationStore<N> {
        &self.store
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    pub fn hooks_mut(&mut self) -> &mut H {
        &mut self.hooks
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.link.state()
    }

    pub fn connection_status(&self) -> ConnectionStatus {
        self.link.status()
    }

    /// Passkey waiting for the user, if a pairing handshake is outstanding
    pub fn passkey(&self) -> Option<Passkey> {
        self.link.passkey()
    }

    /// Bytes buffered towards the next message
    pub fn buffered_len(&self) -> usize {
        self.framing.filled_len()
    }

    /// Age of the notification at `index`, formatted for display
    pub fn relative_time(&self, index: usize) -> Option<RelativeText> {
        let notification = self.store.get(index)?;
        Some(format_relative(self.hooks.now(), notification.timestamp))
    }

    // --- Transport events ---

    /// Dispatch a transport event to the matching handler
    pub fn handle_transport(&mut self, event: TransportEvent<'_>) -> Result<(), EventError> {
        match event {
            TransportEvent::Write { offset, data } => self.on_write(offset, data)?,
            TransportEvent::Connected(result) => self.on_connected(result),
            TransportEvent::Disconnected { reason } => self.on_disconnected(reason),
            TransportEvent::SecurityChanged { level, result } => {
                self.on_security_changed(level, result)
            }
            TransportEvent::PasskeyRequested(code) => self.on_passkey_requested(code)?,
            TransportEvent::PairingCancelled => self.on_pairing_cancelled(),
            TransportEvent::PairingComplete { bonded } => self.on_pairing_complete(bonded),
            TransportEvent::PairingFailed { reason } => self.on_pairing_failed(reason),
            TransportEvent::Rssi(dbm) => self.on_rssi(dbm),
        }
        Ok(())
    }

    /// Characteristic write from the peer
    pub fn on_write(&mut self, offset: u32, data: &[u8]) -> Result<(), WriteError> {
        if !self.link.accepts_commands() {
            warn!(
                "Write of {} bytes refused in state {:?}",
                data.len(),
                self.link.state()
            );
            self.hooks.write_rejected("link not secured");
            return Err(WriteError::NotSecured);
        }

        debug!("Write: {} bytes at offset {}", data.len(), offset);

        match self.framing.ingest(offset, data) {
            Ok(completed) => {
                self.idle_ticks = 0;
                if let Some(message) = completed {
                    self.dispatch(&message);
                }
                Ok(())
            }
            Err(e) => {
                error!(
                    "Buffer overflow: offset={}, len={}, buffered={}",
                    e.offset,
                    e.len,
                    self.framing.filled_len()
                );
                self.hooks.buffer_overflow(e.reason());
                if self.config.overflow_policy == OverflowPolicy::ResetBuffer {
                    self.framing.reset();
                    self.idle_ticks = 0;
                }
                Err(e.into())
            }
        }
    }

    pub fn on_connected(&mut self, result: Result<(), u8>) {
        self.link.on_connected(result, &mut self.hooks);
    }

    pub fn on_disconnected(&mut self, reason: u8) {
        if !self.framing.is_empty() {
            debug!("Dropping {} buffered bytes", self.framing.filled_len());
        }
        self.framing.reset();
        self.idle_ticks = 0;

        if self.config.cancel_delete_on_disconnect && self.store.undo_delete().is_ok() {
            info!("Pending deletion cancelled by disconnect");
            self.hooks.on_store_changed(&self.store);
        }

        self.link.on_disconnected(reason, &mut self.hooks);
    }

    pub fn on_security_changed(&mut self, level: SecurityLevel, result: Result<(), u8>) {
        self.link.on_security_changed(level, result, &mut self.hooks);
    }

    pub fn on_passkey_requested(&mut self, code: u32) -> Result<(), PairingError> {
        self.link
            .passkey_requested(Passkey::new(code), &mut self.hooks)
            .inspect_err(|e| self.hooks.security_failure(e.reason()))
    }

    pub fn on_pairing_cancelled(&mut self) {
        self.link.pairing_cancelled(&mut self.hooks);
    }

    pub fn on_pairing_complete(&mut self, bonded: bool) {
        self.link.pairing_complete(bonded, &mut self.hooks);
    }

    pub fn on_pairing_failed(&mut self, reason: u8) {
        self.link.pairing_failed(reason, &mut self.hooks);
    }

    pub fn on_rssi(&mut self, dbm: i8) {
        self.link.on_rssi(dbm, &mut self.hooks);
    }

    // --- Link control ---

    /// Ask the transport to drop the peer link
    pub fn disconnect(&mut self) -> Result<(), LinkError> {
        self.link.disconnect(&mut self.hooks)
    }

    pub fn start_advertising(&mut self) -> Result<(), LinkError> {
        self.link.start_advertising(&mut self.hooks)
    }

    pub fn stop_advertising(&mut self) -> Result<(), LinkError> {
        self.link.stop_advertising(&mut self.hooks)
    }

    // --- Command dispatch ---

    fn dispatch(&mut self, message: &[u8]) {
        match Command::decode(message) {
            Ok(command) => self.execute(command),
            Err(e) => {
                warn!("Malformed packet ({} bytes): {}", message.len(), e.reason());
                self.hooks.malformed_packet(e.reason());
            }
        }
    }

    fn execute(&mut self, command: Command) {
        match command {
            Command::TimeSync { unix_timestamp } => {
                info!("Time sync: {}", unix_timestamp);
                match self.hooks.set_time(unix_timestamp) {
                    Ok(()) => self.publish_time(),
                    Err(e) => {
                        error!("Failed to set clock: {}", e.reason());
                        self.hooks.clock_failure(e.reason());
                    }
                }
            }
            Command::AddNotification(payload) => {
                info!(
                    "Notification from {}: {}",
                    payload.app_name.as_str(),
                    payload.title.as_str()
                );
                self.store.add_payload(payload);
                self.link.publish_status(&mut self.hooks);
                self.hooks.on_store_changed(&self.store);
            }
            Command::ClearAll => {
                info!("Clear all notifications");
                self.store.clear_all();
                self.hooks.on_store_changed(&self.store);
            }
            Command::RemoveNotification | Command::Action => {
                debug!("Command {} not implemented", command.tag());
            }
        }
    }

    fn publish_time(&mut self) {
        let text = format_clock(self.hooks.now());
        self.hooks.on_time_changed(&text);
    }

    // --- User actions ---

    /// Apply a user action
    ///
    /// While a passkey is shown, `Confirm` and `Cancel` answer it. Otherwise
    /// `Cancel` undoes a pending deletion, and navigation is ignored until the
    /// deletion completes or is undone.
    ///
    /// Pairing errors are also reported as security failures.
    pub fn handle_action(&mut self, action: UserAction) -> Result<(), ActionError> {
        let result = self.apply_action(action);
        if let Err(ActionError::Pairing(e)) = &result {
            warn!("{:?} refused: {}", action, e.reason());
            self.hooks.security_failure(e.reason());
        }
        result
    }

    fn apply_action(&mut self, action: UserAction) -> Result<(), ActionError> {
        if self.link.is_pairing() {
            match action {
                UserAction::Confirm => return Ok(self.link.confirm_passkey(&mut self.hooks)?),
                UserAction::Cancel => return Ok(self.link.reject_passkey(&mut self.hooks)?),
                _ => {}
            }
        }

        if self.store.is_deletion_pending() {
            if action == UserAction::Cancel {
                self.store.undo_delete()?;
                info!("Deletion undone");
                self.hooks.on_store_changed(&self.store);
            } else {
                debug!("{:?} ignored while a deletion is pending", action);
            }
            return Ok(());
        }

        match action {
            UserAction::Advance => self.store.advance(),
            UserAction::GoBack => self.store.retreat(),
            UserAction::RequestDelete => self.store.request_delete(self.store.cursor())?,
            UserAction::MarkRead => self.store.mark_read(self.store.cursor())?,
            UserAction::Confirm => return Err(PairingError::NoSession.into()),
            UserAction::Cancel => return Err(StoreError::NothingPending.into()),
        }

        if !self.store.is_empty() {
            self.hooks.on_store_changed(&self.store);
        }
        Ok(())
    }

    // --- Periodic work ---

    /// Advance time by one tick (`tick_interval_ms`)
    pub fn tick(&mut self) {
        if self.store.tick() {
            info!("Pending deletion applied");
            self.hooks.on_store_changed(&self.store);
        }

        self.tick_assembly();

        self.refresh_ticks = self.refresh_ticks.saturating_add(1);
        if self.refresh_ticks >= self.config.relative_time_refresh_ticks() {
            self.refresh_ticks = 0;
            if !self.store.is_empty() {
                self.hooks.on_store_changed(&self.store);
            }
        }

        self.clock_ticks = self.clock_ticks.saturating_add(1);
        if self.clock_ticks >= self.config.clock_refresh_ticks() {
            self.clock_ticks = 0;
            self.publish_time();
        }
    }

    /// Complete a buffered message once the peer has gone quiet
    fn tick_assembly(&mut self) {
        if self.config.assembly_idle_ticks == 0 || self.framing.is_empty() {
            return;
        }

        self.idle_ticks = self.idle_ticks.saturating_add(1);
        if self.idle_ticks < self.config.assembly_idle_ticks {
            return;
        }

        self.idle_ticks = 0;
        if let Some(message) = self.framing.finish() {
            debug!("Idle completion of {} bytes", message.len());
            self.dispatch(&message);
        }
    }
}
