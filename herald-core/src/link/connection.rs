//! Peer link owner
//!
//! [`Link`] holds the connection state, security level, signal strength and
//! pairing session, and turns transport events into state transitions plus
//! the collaborator calls each one implies.

use super::events::LinkEvent;
use super::machine::{ConnectionState, ConnectionStatus, SecurityLevel};
use super::pairing::{Passkey, PairingError, PairingSession};
use crate::traits::Collaborators;

/// Errors from link control operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError {
    /// No peer link exists
    NotConnected,
    /// A peer link already exists
    AlreadyConnected,
    /// The transport refused the request
    Transport,
}

impl LinkError {
    /// Human-readable reason for error reporting
    pub fn reason(&self) -> &'static str {
        match self {
            LinkError::NotConnected => "not connected",
            LinkError::AlreadyConnected => "already connected",
            LinkError::Transport => "transport refused request",
        }
    }
}

/// The single peer link
#[derive(Debug, Clone)]
pub struct Link {
    state: ConnectionState,
    security: SecurityLevel,
    required: SecurityLevel,
    session: Option<PairingSession>,
    rssi: Option<i8>,
    weak_signal_dbm: i8,
    /// Last status handed to the display
    published: ConnectionStatus,
}

impl Link {
    pub fn new(required: SecurityLevel, weak_signal_dbm: i8) -> Self {
        Self {
            state: ConnectionState::Disconnected,
            security: SecurityLevel::L1,
            required,
            session: None,
            rssi: None,
            weak_signal_dbm,
            published: ConnectionStatus::Disconnected,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Security level the transport last reported for this link
    pub fn security_level(&self) -> SecurityLevel {
        self.security
    }

    pub fn required_security(&self) -> SecurityLevel {
        self.required
    }

    pub fn rssi(&self) -> Option<i8> {
        self.rssi
    }

    pub fn session(&self) -> Option<&PairingSession> {
        self.session.as_ref()
    }

    pub fn is_pairing(&self) -> bool {
        self.session.is_some()
    }

    /// Passkey of the outstanding pairing handshake
    pub fn passkey(&self) -> Option<Passkey> {
        self.session.map(|s| s.passkey())
    }

    pub fn accepts_commands(&self) -> bool {
        self.state.accepts_commands()
    }

    /// Display status, downgraded to weak signal when RSSI is low
    pub fn status(&self) -> ConnectionStatus {
        match (self.state.status(), self.rssi) {
            (ConnectionStatus::Connected, Some(rssi)) if rssi < self.weak_signal_dbm => {
                ConnectionStatus::WeakSignal
            }
            (status, _) => status,
        }
    }

    /// Push the current status to the display
    pub fn publish_status<H: Collaborators>(&mut self, hooks: &mut H) {
        self.published = self.status();
        hooks.on_connection_status_changed(self.published);
    }

    fn apply(&mut self, event: LinkEvent) {
        let next = self.state.transition(event);
        if next != self.state {
            debug!("Link {:?} -> {:?}", self.state, next);
        }
        self.state = next;
    }

    // --- Advertising ---

    /// Start advertising; does nothing if already advertising
    pub fn start_advertising<H: Collaborators>(&mut self, hooks: &mut H) -> Result<(), LinkError> {
        match self.state {
            ConnectionState::Advertising => {
                debug!("Advertising already active");
                return Ok(());
            }
            ConnectionState::Disconnected => {}
            _ => return Err(LinkError::AlreadyConnected),
        }

        hooks.start_advertising()?;
        self.apply(LinkEvent::StartAdvertising);
        info!("Advertising started");
        self.publish_status(hooks);
        Ok(())
    }

    /// Stop advertising; does nothing if not advertising
    pub fn stop_advertising<H: Collaborators>(&mut self, hooks: &mut H) -> Result<(), LinkError> {
        if self.state != ConnectionState::Advertising {
            debug!("Advertising not active");
            return Ok(());
        }

        hooks.stop_advertising()?;
        self.apply(LinkEvent::StopAdvertising);
        info!("Advertising stopped");
        Ok(())
    }

    fn readvertise<H: Collaborators>(&mut self, hooks: &mut H) {
        if let Err(e) = self.start_advertising(hooks) {
            error!("Failed to restart advertising: {}", e.reason());
        }
    }

    // --- Connection lifecycle ---

    /// Transport finished a connection attempt; `Err` carries its status code
    pub fn on_connected<H: Collaborators>(&mut self, result: Result<(), u8>, hooks: &mut H) {
        if let Err(code) = result {
            error!("Connection failed (err {})", code);
            self.apply(LinkEvent::LinkFailed);
            self.publish_status(hooks);
            hooks.connection_dropped("connection failed");
            self.readvertise(hooks);
            return;
        }

        if self.state.has_peer() {
            warn!("Ignoring second connection while {:?}", self.state);
            return;
        }

        info!("Connected");
        self.apply(LinkEvent::LinkEstablished);
        self.security = SecurityLevel::L1;
        self.rssi = None;
        self.publish_status(hooks);

        if self.required <= SecurityLevel::L1 {
            self.apply(LinkEvent::SecurityUpgraded);
            self.publish_status(hooks);
            return;
        }

        if let Err(e) = hooks.request_security(self.required) {
            error!("Failed to request security level {}: {}", self.required.as_u8(), e.reason());
            hooks.security_failure("security request failed");
        }
    }

    /// Link dropped, for any reason and from any state
    pub fn on_disconnected<H: Collaborators>(&mut self, reason: u8, hooks: &mut H) {
        info!("Disconnected (reason {})", reason);

        self.apply(LinkEvent::Disconnected);
        self.security = SecurityLevel::L1;
        self.rssi = None;
        if self.session.take().is_some() {
            debug!("Pairing session dropped with the link");
        }
        hooks.hide_passkey();

        self.publish_status(hooks);
        hooks.connection_dropped("connection dropped");
        self.readvertise(hooks);
    }

    /// Transport reports a security change; `Err` carries its error code
    pub fn on_security_changed<H: Collaborators>(
        &mut self,
        level: SecurityLevel,
        result: Result<(), u8>,
        hooks: &mut H,
    ) {
        if let Err(code) = result {
            warn!("Security failed at level {} (err {})", level.as_u8(), code);
            hooks.security_failure("security failed");
            return;
        }

        info!("Security changed to level {}", level.as_u8());
        self.security = level;
        let event = if level >= self.required {
            LinkEvent::SecurityUpgraded
        } else {
            LinkEvent::SecurityPartial
        };

        let before = self.status();
        self.apply(event);
        if self.status() != before {
            self.publish_status(hooks);
        }
    }

    /// Latest signal strength report for the peer link
    pub fn on_rssi<H: Collaborators>(&mut self, dbm: i8, hooks: &mut H) {
        if !self.state.has_peer() {
            return;
        }
        self.rssi = Some(dbm);
        if self.status() != self.published {
            self.publish_status(hooks);
        }
    }

    /// Ask the transport to drop the peer link
    pub fn disconnect<H: Collaborators>(&mut self, hooks: &mut H) -> Result<(), LinkError> {
        if !self.state.has_peer() {
            warn!("No active connection to disconnect");
            return Err(LinkError::NotConnected);
        }
        info!("Disconnecting");
        hooks.disconnect()
    }

    // --- Pairing ---

    /// Transport asks the user to compare a passkey
    ///
    /// A request while another is outstanding replaces it.
    pub fn passkey_requested<H: Collaborators>(
        &mut self,
        passkey: Passkey,
        hooks: &mut H,
    ) -> Result<(), PairingError> {
        if !self.state.has_peer() {
            warn!("Passkey request without a peer");
            return Err(PairingError::NoPeer);
        }

        if let Some(old) = self.session.replace(PairingSession::new(passkey)) {
            info!("Passkey {} replaces {}", passkey.value(), old.passkey().value());
            hooks.hide_passkey();
        } else {
            info!("Passkey {}", passkey.value());
        }
        hooks.show_passkey(passkey);
        Ok(())
    }

    /// User accepted the passkey
    ///
    /// The session stays open until the transport reports completion or
    /// failure.
    pub fn confirm_passkey<H: Collaborators>(&mut self, hooks: &mut H) -> Result<(), PairingError> {
        let session = self.session.as_mut().ok_or(PairingError::NoSession)?;
        hooks.confirm_passkey()?;
        session.confirm();
        info!("Passkey confirmed");
        Ok(())
    }

    /// User rejected the passkey
    pub fn reject_passkey<H: Collaborators>(&mut self, hooks: &mut H) -> Result<(), PairingError> {
        self.session.take().ok_or(PairingError::NoSession)?;
        hooks.hide_passkey();
        info!("Passkey rejected");
        hooks.cancel_passkey()?;
        Ok(())
    }

    /// Peer cancelled the handshake
    pub fn pairing_cancelled<H: Collaborators>(&mut self, hooks: &mut H) {
        info!("Pairing cancelled");
        self.session = None;
        hooks.hide_passkey();
    }

    pub fn pairing_complete<H: Collaborators>(&mut self, bonded: bool, hooks: &mut H) {
        info!("Pairing completed, bonded: {}", bonded);
        self.session = None;
        hooks.hide_passkey();
        self.apply(LinkEvent::PairingComplete);
        self.publish_status(hooks);
    }

    pub fn pairing_failed<H: Collaborators>(&mut self, reason: u8, hooks: &mut H) {
        warn!("Pairing failed (reason {})", reason);
        self.session = None;
        hooks.hide_passkey();
        hooks.security_failure("pairing failed");
    }
}
