//! Pairing session
//!
//! A session exists only while a passkey handshake is outstanding. The
//! [`Link`](super::Link) owns at most one.

use core::fmt;

use heapless::String;

use super::connection::LinkError;

/// Number of passkey digits
pub const PASSKEY_DIGITS: usize = 6;

const PASSKEY_MODULUS: u32 = 1_000_000;

/// Six-digit pairing code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Passkey(u32);

impl Passkey {
    /// Wrap a transport-supplied code, keeping the low six digits
    pub fn new(code: u32) -> Self {
        Self(code % PASSKEY_MODULUS)
    }

    pub fn value(&self) -> u32 {
        self.0
    }

    /// Zero-padded digits, e.g. `"004217"`
    pub fn digits(&self) -> String<PASSKEY_DIGITS> {
        let mut out = String::new();
        let mut divisor = PASSKEY_MODULUS / 10;
        while divisor > 0 {
            let digit = (self.0 / divisor) % 10;
            // Six ASCII digits always fit
            let _ = out.push(char::from(b'0' + digit as u8));
            divisor /= 10;
        }
        out
    }
}

impl fmt::Display for Passkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:06}", self.0)
    }
}

/// Outstanding passkey handshake
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PairingSession {
    passkey: Passkey,
    confirmed: bool,
}

impl PairingSession {
    pub fn new(passkey: Passkey) -> Self {
        Self {
            passkey,
            confirmed: false,
        }
    }

    pub fn passkey(&self) -> Passkey {
        self.passkey
    }

    /// Whether the user already confirmed and the transport is finishing up
    pub fn is_confirmed(&self) -> bool {
        self.confirmed
    }

    pub(crate) fn confirm(&mut self) {
        self.confirmed = true;
    }
}

/// Pairing operation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PairingError {
    /// No pairing handshake is outstanding
    NoSession,
    /// No peer link to pair with
    NoPeer,
    /// Transport refused the confirm or cancel
    Link(LinkError),
}

impl From<LinkError> for PairingError {
    fn from(e: LinkError) -> Self {
        PairingError::Link(e)
    }
}

impl PairingError {
    /// Human-readable reason for error reporting
    pub fn reason(&self) -> &'static str {
        match self {
            PairingError::NoSession => "no pairing in progress",
            PairingError::NoPeer => "no peer to pair with",
            PairingError::Link(e) => e.reason(),
        }
    }
}
