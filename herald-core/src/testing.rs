//! Recording collaborator for unit tests

extern crate std;

use std::string::String;
use std::vec::Vec;

use crate::link::{ConnectionStatus, LinkError, Passkey, SecurityLevel};
use crate::store::NotificationStore;
use crate::traits::{
    Clock, ClockError, ErrorReporter, LinkControl, NotificationDisplay, PairingUi,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Status(ConnectionStatus),
    Time(String),
    Store {
        len: usize,
        cursor: usize,
        pending: Option<usize>,
    },
    ShowPasskey(Passkey),
    HidePasskey,
    MalformedPacket(&'static str),
    ConnectionDropped(&'static str),
    BufferOverflow(&'static str),
    SecurityFailure(&'static str),
    WriteRejected(&'static str),
    ClockFailure(&'static str),
    StartAdvertising,
    StopAdvertising,
    RequestSecurity(SecurityLevel),
    ConfirmPasskey,
    CancelPasskey,
    Disconnect,
}

#[derive(Debug, Default)]
pub struct Recorder {
    pub calls: Vec<Call>,
    pub now: Option<u32>,
    /// Every link control request fails
    pub fail_link: bool,
    /// Setting the clock fails
    pub fail_clock: bool,
}

impl Recorder {
    pub fn last_status(&self) -> Option<ConnectionStatus> {
        self.calls.iter().rev().find_map(|c| match c {
            Call::Status(s) => Some(*s),
            _ => None,
        })
    }

    fn link_call(&mut self, call: Call) -> Result<(), LinkError> {
        if self.fail_link {
            return Err(LinkError::Transport);
        }
        self.calls.push(call);
        Ok(())
    }
}

impl Clock for Recorder {
    fn set_time(&mut self, unix_timestamp: u32) -> Result<(), ClockError> {
        if self.fail_clock {
            return Err(ClockError::Unavailable);
        }
        self.now = Some(unix_timestamp);
        Ok(())
    }

    fn now(&self) -> Option<u32> {
        self.now
    }
}

impl NotificationDisplay for Recorder {
    fn on_connection_status_changed(&mut self, status: ConnectionStatus) {
        self.calls.push(Call::Status(status));
    }

    fn on_time_changed(&mut self, time: &str) {
        self.calls.push(Call::Time(String::from(time)));
    }

    fn on_store_changed<const N: usize>(&mut self, store: &NotificationStore<N>) {
        self.calls.push(Call::Store {
            len: store.len(),
            cursor: store.cursor(),
            pending: store.pending_deletion().map(|p| p.index()),
        });
    }
}

impl PairingUi for Recorder {
    fn show_passkey(&mut self, passkey: Passkey) {
        self.calls.push(Call::ShowPasskey(passkey));
    }

    fn hide_passkey(&mut self) {
        self.calls.push(Call::HidePasskey);
    }
}

impl ErrorReporter for Recorder {
    fn malformed_packet(&mut self, reason: &'static str) {
        self.calls.push(Call::MalformedPacket(reason));
    }

    fn connection_dropped(&mut self, reason: &'static str) {
        self.calls.push(Call::ConnectionDropped(reason));
    }

    fn buffer_overflow(&mut self, reason: &'static str) {
        self.calls.push(Call::BufferOverflow(reason));
    }

    fn security_failure(&mut self, reason: &'static str) {
        self.calls.push(Call::SecurityFailure(reason));
    }

    fn write_rejected(&mut self, reason: &'static str) {
        self.calls.push(Call::WriteRejected(reason));
    }

    fn clock_failure(&mut self, reason: &'static str) {
        self.calls.push(Call::ClockFailure(reason));
    }
}

impl LinkControl for Recorder {
    fn start_advertising(&mut self) -> Result<(), LinkError> {
        self.link_call(Call::StartAdvertising)
    }

    fn stop_advertising(&mut self) -> Result<(), LinkError> {
        self.link_call(Call::StopAdvertising)
    }

    fn request_security(&mut self, level: SecurityLevel) -> Result<(), LinkError> {
        self.link_call(Call::RequestSecurity(level))
    }

    fn confirm_passkey(&mut self) -> Result<(), LinkError> {
        self.link_call(Call::ConfirmPasskey)
    }

    fn cancel_passkey(&mut self) -> Result<(), LinkError> {
        self.link_call(Call::CancelPasskey)
    }

    fn disconnect(&mut self) -> Result<(), LinkError> {
        self.link_call(Call::Disconnect)
    }
}
