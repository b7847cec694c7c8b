//! Message types carried over the coprocessor link

use super::frame::{Frame, FrameError};

/// ATT status: write accepted
pub const ATT_SUCCESS: u8 = 0x00;
/// ATT status: write offset beyond the attribute value
pub const ATT_ERROR_INVALID_OFFSET: u8 = 0x07;
/// ATT status: link must be encrypted first
pub const ATT_ERROR_INSUFFICIENT_ENCRYPTION: u8 = 0x0F;

/// Radio → host message type IDs
pub mod radio_type {
    pub const CONNECTED: u8 = 0x01;
    pub const DISCONNECTED: u8 = 0x02;
    pub const SECURITY_CHANGED: u8 = 0x03;
    pub const WRITE: u8 = 0x04;
    pub const PASSKEY: u8 = 0x05;
    pub const PAIRING_CANCELLED: u8 = 0x06;
    pub const PAIRING_COMPLETE: u8 = 0x07;
    pub const PAIRING_FAILED: u8 = 0x08;
    pub const RSSI: u8 = 0x09;
}

/// Host → radio message type IDs
pub mod host_type {
    pub const START_ADVERTISING: u8 = 0x20;
    pub const STOP_ADVERTISING: u8 = 0x21;
    pub const REQUEST_SECURITY: u8 = 0x22;
    pub const CONFIRM_PASSKEY: u8 = 0x23;
    pub const CANCEL_PASSKEY: u8 = 0x24;
    pub const DISCONNECT: u8 = 0x25;
    pub const WRITE_RESULT: u8 = 0x26;
}

/// Events reported by the radio coprocessor
///
/// Status bytes follow the HCI convention: zero is success, anything else is
/// the controller's error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RadioEvent<'a> {
    Connected { status: u8 },
    Disconnected { reason: u8 },
    SecurityChanged { level: u8, status: u8 },
    /// Characteristic write, borrowed from the frame payload
    Write { offset: u16, data: &'a [u8] },
    Passkey(u32),
    PairingCancelled,
    PairingComplete { bonded: bool },
    PairingFailed { reason: u8 },
    Rssi(i8),
}

impl<'a> RadioEvent<'a> {
    /// Parse an event from a frame
    pub fn from_frame(frame: &'a Frame) -> Result<Self, FrameError> {
        let p = frame.payload.as_slice();

        match frame.msg_type {
            radio_type::CONNECTED => Ok(RadioEvent::Connected {
                status: byte(p, 0)?,
            }),
            radio_type::DISCONNECTED => Ok(RadioEvent::Disconnected {
                reason: byte(p, 0)?,
            }),
            radio_type::SECURITY_CHANGED => Ok(RadioEvent::SecurityChanged {
                level: byte(p, 0)?,
                status: byte(p, 1)?,
            }),
            radio_type::WRITE => {
                if p.len() < 2 {
                    return Err(FrameError::InvalidFrame);
                }
                Ok(RadioEvent::Write {
                    offset: u16::from_le_bytes([p[0], p[1]]),
                    data: &p[2..],
                })
            }
            radio_type::PASSKEY => {
                let bytes: [u8; 4] = p
                    .get(..4)
                    .and_then(|b| b.try_into().ok())
                    .ok_or(FrameError::InvalidFrame)?;
                Ok(RadioEvent::Passkey(u32::from_le_bytes(bytes)))
            }
            radio_type::PAIRING_CANCELLED => Ok(RadioEvent::PairingCancelled),
            radio_type::PAIRING_COMPLETE => Ok(RadioEvent::PairingComplete {
                bonded: byte(p, 0)? != 0,
            }),
            radio_type::PAIRING_FAILED => Ok(RadioEvent::PairingFailed {
                reason: byte(p, 0)?,
            }),
            radio_type::RSSI => Ok(RadioEvent::Rssi(byte(p, 0)? as i8)),
            other => Err(FrameError::UnknownType(other)),
        }
    }

    /// Convert to a frame (used by coprocessor simulators and tests)
    pub fn to_frame(&self) -> Result<Frame, FrameError> {
        match *self {
            RadioEvent::Connected { status } => Frame::new(radio_type::CONNECTED, &[status]),
            RadioEvent::Disconnected { reason } => Frame::new(radio_type::DISCONNECTED, &[reason]),
            RadioEvent::SecurityChanged { level, status } => {
                Frame::new(radio_type::SECURITY_CHANGED, &[level, status])
            }
            RadioEvent::Write { offset, data } => {
                let mut frame = Frame::new(radio_type::WRITE, &offset.to_le_bytes())?;
                frame
                    .payload
                    .extend_from_slice(data)
                    .map_err(|_| FrameError::PayloadTooLarge)?;
                Ok(frame)
            }
            RadioEvent::Passkey(value) => Frame::new(radio_type::PASSKEY, &value.to_le_bytes()),
            RadioEvent::PairingCancelled => Ok(Frame::empty(radio_type::PAIRING_CANCELLED)),
            RadioEvent::PairingComplete { bonded } => {
                Frame::new(radio_type::PAIRING_COMPLETE, &[bonded as u8])
            }
            RadioEvent::PairingFailed { reason } => {
                Frame::new(radio_type::PAIRING_FAILED, &[reason])
            }
            RadioEvent::Rssi(dbm) => Frame::new(radio_type::RSSI, &[dbm as u8]),
        }
    }
}

fn byte(payload: &[u8], index: usize) -> Result<u8, FrameError> {
    payload.get(index).copied().ok_or(FrameError::InvalidFrame)
}

/// Commands sent from the host to the radio coprocessor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HostCommand {
    StartAdvertising,
    StopAdvertising,
    RequestSecurity { level: u8 },
    ConfirmPasskey,
    CancelPasskey,
    Disconnect,
    /// Answer to the last [`RadioEvent::Write`], as an ATT status code
    WriteResult { att_status: u8 },
}

impl HostCommand {
    /// Convert to a frame for transmission
    pub fn to_frame(&self) -> Frame {
        match *self {
            HostCommand::StartAdvertising => Frame::empty(host_type::START_ADVERTISING),
            HostCommand::StopAdvertising => Frame::empty(host_type::STOP_ADVERTISING),
            HostCommand::RequestSecurity { level } => {
                one_byte(host_type::REQUEST_SECURITY, level)
            }
            HostCommand::ConfirmPasskey => Frame::empty(host_type::CONFIRM_PASSKEY),
            HostCommand::CancelPasskey => Frame::empty(host_type::CANCEL_PASSKEY),
            HostCommand::Disconnect => Frame::empty(host_type::DISCONNECT),
            HostCommand::WriteResult { att_status } => {
                one_byte(host_type::WRITE_RESULT, att_status)
            }
        }
    }

    /// Parse a command from a frame
    pub fn from_frame(frame: &Frame) -> Result<Self, FrameError> {
        let p = frame.payload.as_slice();

        match frame.msg_type {
            host_type::START_ADVERTISING => Ok(HostCommand::StartAdvertising),
            host_type::STOP_ADVERTISING => Ok(HostCommand::StopAdvertising),
            host_type::REQUEST_SECURITY => Ok(HostCommand::RequestSecurity {
                level: byte(p, 0)?,
            }),
            host_type::CONFIRM_PASSKEY => Ok(HostCommand::ConfirmPasskey),
            host_type::CANCEL_PASSKEY => Ok(HostCommand::CancelPasskey),
            host_type::DISCONNECT => Ok(HostCommand::Disconnect),
            host_type::WRITE_RESULT => Ok(HostCommand::WriteResult {
                att_status: byte(p, 0)?,
            }),
            other => Err(FrameError::UnknownType(other)),
        }
    }
}

fn one_byte(msg_type: u8, value: u8) -> Frame {
    let mut frame = Frame::empty(msg_type);
    // A fresh frame always has room for one byte
    let _ = frame.payload.push(value);
    frame
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::frame::FrameParser;

    #[test]
    fn test_write_event_borrows_payload() {
        let frame = Frame::new(radio_type::WRITE, &[0x10, 0x00, 0x01, 0x02, 0x03]).unwrap();
        assert_eq!(
            RadioEvent::from_frame(&frame),
            Ok(RadioEvent::Write {
                offset: 16,
                data: &[0x01, 0x02, 0x03]
            })
        );
    }

    #[test]
    fn test_write_event_without_offset_is_invalid() {
        let frame = Frame::new(radio_type::WRITE, &[0x10]).unwrap();
        assert_eq!(RadioEvent::from_frame(&frame), Err(FrameError::InvalidFrame));
    }

    #[test]
    fn test_passkey_little_endian() {
        let frame = Frame::new(radio_type::PASSKEY, &123_456u32.to_le_bytes()).unwrap();
        assert_eq!(RadioEvent::from_frame(&frame), Ok(RadioEvent::Passkey(123_456)));
    }

    #[test]
    fn test_rssi_is_signed() {
        let frame = Frame::new(radio_type::RSSI, &[0xB0]).unwrap();
        assert_eq!(RadioEvent::from_frame(&frame), Ok(RadioEvent::Rssi(-80)));
    }

    #[test]
    fn test_missing_status_byte() {
        let frame = Frame::empty(radio_type::CONNECTED);
        assert_eq!(RadioEvent::from_frame(&frame), Err(FrameError::InvalidFrame));
    }

    #[test]
    fn test_unknown_radio_type() {
        let frame = Frame::empty(0x7F);
        assert_eq!(
            RadioEvent::from_frame(&frame),
            Err(FrameError::UnknownType(0x7F))
        );
    }

    #[test]
    fn test_write_event_through_parser() {
        let data = [0x02u8, 0x00, 0x00, 0x03];
        let event = RadioEvent::Write { offset: 0, data: &data };
        let encoded = event.to_frame().unwrap().encode_to_vec().unwrap();

        let mut parser = FrameParser::new();
        let (frame, _) = parser.feed_bytes(&encoded).unwrap();
        let frame = frame.unwrap();
        assert_eq!(RadioEvent::from_frame(&frame), Ok(event));
    }

    #[test]
    fn test_write_result_frame() {
        let frame = HostCommand::WriteResult {
            att_status: ATT_ERROR_INSUFFICIENT_ENCRYPTION,
        }
        .to_frame();
        assert_eq!(frame.msg_type, host_type::WRITE_RESULT);
        assert_eq!(frame.payload.as_slice(), &[0x0F]);
    }

    #[test]
    fn test_host_commands_parse_back() {
        let commands = [
            HostCommand::StartAdvertising,
            HostCommand::StopAdvertising,
            HostCommand::RequestSecurity { level: 2 },
            HostCommand::ConfirmPasskey,
            HostCommand::CancelPasskey,
            HostCommand::Disconnect,
            HostCommand::WriteResult { att_status: 0 },
        ];
        for cmd in commands {
            assert_eq!(HostCommand::from_frame(&cmd.to_frame()), Ok(cmd));
        }
    }
}
