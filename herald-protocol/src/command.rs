//! Command set carried by the notification characteristic
//!
//! Every message starts with a one-byte tag. Multi-byte integers are
//! little-endian.
//!
//! ```text
//! 0x01 AddNotification  [cat][applen][titlelen][bodylen][ts:4][app][title][body]
//! 0x02 RemoveNotification  reserved
//! 0x03 ClearAll
//! 0x04 Action              reserved
//! 0x05 TimeSync         [ts:4]
//! ```

use heapless::{String, Vec};

use crate::assembly::{Message, MAX_MESSAGE_SIZE};
use crate::category::NotificationCategory;

// Command tags
pub const CMD_ADD_NOTIFICATION: u8 = 0x01;
pub const CMD_REMOVE_NOTIFICATION: u8 = 0x02;
pub const CMD_CLEAR_ALL: u8 = 0x03;
pub const CMD_ACTION: u8 = 0x04;
pub const CMD_TIME_SYNC: u8 = 0x05;

/// Storage capacity of the app name, in bytes
pub const APP_NAME_CAPACITY: usize = 31;
/// Storage capacity of the title (sender), in bytes
pub const TITLE_CAPACITY: usize = 63;
/// Storage capacity of the body, in bytes
pub const BODY_CAPACITY: usize = 255;

/// Tag + category + three length bytes + timestamp
pub const ADD_HEADER_LEN: usize = 9;
/// Tag + timestamp
pub const TIME_SYNC_LEN: usize = 5;

pub type AppName = String<APP_NAME_CAPACITY>;
pub type Title = String<TITLE_CAPACITY>;
pub type Body = String<BODY_CAPACITY>;

/// Errors produced while decoding a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeError {
    /// Zero-length message
    Empty,
    /// Message shorter than its command's fixed header
    Truncated { expected: usize, actual: usize },
    /// Declared string lengths disagree with the message length
    InvalidLength { declared: usize, actual: usize },
    /// Tag byte is not a known command
    UnknownCommand(u8),
}

impl DecodeError {
    /// Human-readable reason for error reporting
    pub fn reason(&self) -> &'static str {
        match self {
            DecodeError::Empty => "empty packet",
            DecodeError::Truncated { .. } => "packet too short",
            DecodeError::InvalidLength { .. } => "invalid packet lengths",
            DecodeError::UnknownCommand(_) => "unknown command",
        }
    }
}

/// Errors produced while encoding a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EncodeError {
    /// Output buffer too small for the encoded command
    BufferTooSmall,
}

/// Contents of an AddNotification command
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NotificationPayload {
    pub category: NotificationCategory,
    pub app_name: AppName,
    pub title: Title,
    pub body: Body,
    /// Unix epoch seconds
    pub unix_timestamp: u32,
}

impl NotificationPayload {
    /// Build a payload, clamping each string to its storage capacity
    pub fn new(
        category: NotificationCategory,
        app_name: &str,
        title: &str,
        body: &str,
        unix_timestamp: u32,
    ) -> Self {
        Self {
            category,
            app_name: clamped(app_name),
            title: clamped(title),
            body: clamped(body),
            unix_timestamp,
        }
    }
}

/// Commands sent by the companion app
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Set the device clock
    TimeSync { unix_timestamp: u32 },
    /// Store and show a notification
    AddNotification(NotificationPayload),
    /// Drop every stored notification
    ClearAll,
    /// Reserved; payload not defined yet
    RemoveNotification,
    /// Reserved; payload not defined yet
    Action,
}

impl Command {
    /// Decode a complete message.
    ///
    /// Pure: nothing outside the returned value is touched.
    pub fn decode(message: &[u8]) -> Result<Self, DecodeError> {
        let (&tag, _) = message.split_first().ok_or(DecodeError::Empty)?;

        match tag {
            CMD_TIME_SYNC => {
                let unix_timestamp = read_u32(message, 1).ok_or(DecodeError::Truncated {
                    expected: TIME_SYNC_LEN,
                    actual: message.len(),
                })?;
                Ok(Command::TimeSync { unix_timestamp })
            }
            CMD_ADD_NOTIFICATION => decode_add(message).map(Command::AddNotification),
            CMD_CLEAR_ALL => Ok(Command::ClearAll),
            CMD_REMOVE_NOTIFICATION => Ok(Command::RemoveNotification),
            CMD_ACTION => Ok(Command::Action),
            other => Err(DecodeError::UnknownCommand(other)),
        }
    }

    /// Wire tag of this command
    pub fn tag(&self) -> u8 {
        match self {
            Command::TimeSync { .. } => CMD_TIME_SYNC,
            Command::AddNotification(_) => CMD_ADD_NOTIFICATION,
            Command::ClearAll => CMD_CLEAR_ALL,
            Command::RemoveNotification => CMD_REMOVE_NOTIFICATION,
            Command::Action => CMD_ACTION,
        }
    }

    /// Encode this command into a byte buffer
    ///
    /// Returns the number of bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, EncodeError> {
        match self {
            Command::TimeSync { unix_timestamp } => {
                let out = buffer
                    .get_mut(..TIME_SYNC_LEN)
                    .ok_or(EncodeError::BufferTooSmall)?;
                out[0] = CMD_TIME_SYNC;
                out[1..].copy_from_slice(&unix_timestamp.to_le_bytes());
                Ok(TIME_SYNC_LEN)
            }
            Command::AddNotification(payload) => encode_add(payload, buffer),
            Command::ClearAll | Command::RemoveNotification | Command::Action => {
                let out = buffer.first_mut().ok_or(EncodeError::BufferTooSmall)?;
                *out = self.tag();
                Ok(1)
            }
        }
    }

    /// Encode this command into a heapless Vec
    pub fn encode_to_vec(&self) -> Result<Message, EncodeError> {
        let mut buffer = [0u8; MAX_MESSAGE_SIZE];
        let len = self.encode(&mut buffer)?;
        let mut vec = Vec::new();
        vec.extend_from_slice(&buffer[..len])
            .map_err(|_| EncodeError::BufferTooSmall)?;
        Ok(vec)
    }
}

fn decode_add(message: &[u8]) -> Result<NotificationPayload, DecodeError> {
    if message.len() < ADD_HEADER_LEN {
        return Err(DecodeError::Truncated {
            expected: ADD_HEADER_LEN,
            actual: message.len(),
        });
    }

    let category = NotificationCategory::from_byte(message[1]);
    let app_len = message[2] as usize;
    let title_len = message[3] as usize;
    let body_len = message[4] as usize;
    let unix_timestamp = read_u32(message, 5).ok_or(DecodeError::Truncated {
        expected: ADD_HEADER_LEN,
        actual: message.len(),
    })?;

    // No trailing garbage, no short strings
    let declared = ADD_HEADER_LEN + app_len + title_len + body_len;
    if declared != message.len() {
        return Err(DecodeError::InvalidLength {
            declared,
            actual: message.len(),
        });
    }

    let (app, rest) = message[ADD_HEADER_LEN..].split_at(app_len);
    let (title, body) = rest.split_at(title_len);

    Ok(NotificationPayload {
        category,
        app_name: clamped_utf8(app),
        title: clamped_utf8(title),
        body: clamped_utf8(body),
        unix_timestamp,
    })
}

fn encode_add(payload: &NotificationPayload, buffer: &mut [u8]) -> Result<usize, EncodeError> {
    let app = payload.app_name.as_bytes();
    let title = payload.title.as_bytes();
    let body = payload.body.as_bytes();

    let total = ADD_HEADER_LEN + app.len() + title.len() + body.len();
    let out = buffer.get_mut(..total).ok_or(EncodeError::BufferTooSmall)?;

    // String capacities are all below 256, so the lengths fit a byte
    out[0] = CMD_ADD_NOTIFICATION;
    out[1] = payload.category.to_byte();
    out[2] = app.len() as u8;
    out[3] = title.len() as u8;
    out[4] = body.len() as u8;
    out[5..9].copy_from_slice(&payload.unix_timestamp.to_le_bytes());

    let mut pos = ADD_HEADER_LEN;
    for field in [app, title, body] {
        out[pos..pos + field.len()].copy_from_slice(field);
        pos += field.len();
    }

    Ok(total)
}

fn read_u32(data: &[u8], at: usize) -> Option<u32> {
    let bytes = data.get(at..at + 4)?;
    Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

/// Longest prefix of `s` that fits in `max` bytes without splitting a character
pub fn clamp_str(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Copy a string into fixed storage, clamped to capacity
pub fn clamped<const N: usize>(s: &str) -> String<N> {
    let mut out = String::new();
    // Cannot fail: the input is clamped to N bytes first
    let _ = out.push_str(clamp_str(s, N));
    out
}

/// Copy wire bytes into fixed storage, clamped to capacity.
///
/// Stops at the first invalid or cut-off UTF-8 sequence.
fn clamped_utf8<const N: usize>(bytes: &[u8]) -> String<N> {
    let limit = bytes.len().min(N);
    let text = match core::str::from_utf8(&bytes[..limit]) {
        Ok(text) => text,
        Err(e) => core::str::from_utf8(&bytes[..e.valid_up_to()]).unwrap_or_default(),
    };
    clamped(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add_message(app: &[u8], title: &[u8], body: &[u8], ts: u32) -> Vec<u8, 600> {
        let mut msg = Vec::new();
        msg.extend_from_slice(&[
            CMD_ADD_NOTIFICATION,
            1,
            app.len() as u8,
            title.len() as u8,
            body.len() as u8,
        ])
        .unwrap();
        msg.extend_from_slice(&ts.to_le_bytes()).unwrap();
        msg.extend_from_slice(app).unwrap();
        msg.extend_from_slice(title).unwrap();
        msg.extend_from_slice(body).unwrap();
        msg
    }

    #[test]
    fn test_empty_message() {
        assert_eq!(Command::decode(&[]), Err(DecodeError::Empty));
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(Command::decode(&[0x7F]), Err(DecodeError::UnknownCommand(0x7F)));
        assert_eq!(Command::decode(&[0x00, 1, 2]), Err(DecodeError::UnknownCommand(0x00)));
    }

    #[test]
    fn test_time_sync() {
        let msg = [CMD_TIME_SYNC, 0x00, 0xF1, 0x53, 0x65];
        assert_eq!(
            Command::decode(&msg),
            Ok(Command::TimeSync {
                unix_timestamp: 0x6553_F100
            })
        );
    }

    #[test]
    fn test_time_sync_truncated() {
        assert_eq!(
            Command::decode(&[CMD_TIME_SYNC, 1, 2, 3]),
            Err(DecodeError::Truncated {
                expected: 5,
                actual: 4
            })
        );
    }

    #[test]
    fn test_add_notification() {
        let msg = add_message(b"A", b"B", b"C", 1000);
        let cmd = Command::decode(&msg).unwrap();

        let Command::AddNotification(payload) = cmd else {
            panic!("expected AddNotification");
        };
        assert_eq!(payload.category, NotificationCategory::Message);
        assert_eq!(payload.app_name.as_str(), "A");
        assert_eq!(payload.title.as_str(), "B");
        assert_eq!(payload.body.as_str(), "C");
        assert_eq!(payload.unix_timestamp, 1000);
    }

    #[test]
    fn test_add_notification_empty_strings() {
        let msg = add_message(b"", b"", b"", 7);
        let Ok(Command::AddNotification(payload)) = Command::decode(&msg) else {
            panic!("expected AddNotification");
        };
        assert!(payload.app_name.is_empty());
        assert!(payload.body.is_empty());
    }

    #[test]
    fn test_add_notification_short_header() {
        assert_eq!(
            Command::decode(&[CMD_ADD_NOTIFICATION, 1, 0, 0, 0, 0, 0, 0]),
            Err(DecodeError::Truncated {
                expected: 9,
                actual: 8
            })
        );
    }

    #[test]
    fn test_declared_length_longer_than_data() {
        // applen = 5 but only 3 bytes follow the header
        let mut msg = add_message(b"abc", b"", b"", 0);
        msg[2] = 5;
        assert_eq!(
            Command::decode(&msg),
            Err(DecodeError::InvalidLength {
                declared: 14,
                actual: 12
            })
        );
    }

    #[test]
    fn test_trailing_garbage_rejected() {
        let mut msg = add_message(b"abc", b"t", b"b", 0);
        msg.push(0xEE).unwrap();
        assert!(matches!(
            Command::decode(&msg),
            Err(DecodeError::InvalidLength { .. })
        ));
    }

    #[test]
    fn test_long_strings_are_clamped() {
        let app = [b'a'; 40];
        let title = [b't'; 100];
        let body = [b'b'; 255];
        let msg = add_message(&app, &title, &body, 0);

        let Ok(Command::AddNotification(payload)) = Command::decode(&msg) else {
            panic!("expected AddNotification");
        };
        assert_eq!(payload.app_name.len(), APP_NAME_CAPACITY);
        assert_eq!(payload.title.len(), TITLE_CAPACITY);
        assert_eq!(payload.body.len(), BODY_CAPACITY);
    }

    #[test]
    fn test_clamp_backs_off_to_char_boundary() {
        // 16 two-byte Hebrew letters = 32 bytes, one more than the app name holds
        let shin = "ש".as_bytes();
        let mut app = Vec::<u8, 32>::new();
        for _ in 0..16 {
            app.extend_from_slice(shin).unwrap();
        }
        let msg = add_message(&app, b"", b"", 0);

        let Ok(Command::AddNotification(payload)) = Command::decode(&msg) else {
            panic!("expected AddNotification");
        };
        assert_eq!(payload.app_name.len(), 30);
        assert_eq!(payload.app_name.chars().count(), 15);
    }

    #[test]
    fn test_invalid_utf8_keeps_valid_prefix() {
        let msg = add_message(b"ok\xFFbad", b"", b"", 0);
        let Ok(Command::AddNotification(payload)) = Command::decode(&msg) else {
            panic!("expected AddNotification");
        };
        assert_eq!(payload.app_name.as_str(), "ok");
    }

    #[test]
    fn test_clear_all_ignores_trailing_bytes() {
        assert_eq!(Command::decode(&[CMD_CLEAR_ALL]), Ok(Command::ClearAll));
        assert_eq!(Command::decode(&[CMD_CLEAR_ALL, 1, 2, 3]), Ok(Command::ClearAll));
    }

    #[test]
    fn test_reserved_commands_decode() {
        assert_eq!(
            Command::decode(&[CMD_REMOVE_NOTIFICATION, 4]),
            Ok(Command::RemoveNotification)
        );
        assert_eq!(Command::decode(&[CMD_ACTION]), Ok(Command::Action));
    }

    #[test]
    fn test_encode_add_roundtrip() {
        let original = Command::AddNotification(NotificationPayload::new(
            NotificationCategory::Message,
            "A",
            "B",
            "C",
            1000,
        ));
        let encoded = original.encode_to_vec().unwrap();
        assert_eq!(encoded.len(), 12);
        assert_eq!(Command::decode(&encoded), Ok(original));
    }

    #[test]
    fn test_encode_buffer_too_small() {
        let cmd = Command::TimeSync { unix_timestamp: 1 };
        let mut buf = [0u8; 4];
        assert_eq!(cmd.encode(&mut buf), Err(EncodeError::BufferTooSmall));
        assert_eq!(Command::ClearAll.encode(&mut []), Err(EncodeError::BufferTooSmall));
    }

    #[test]
    fn test_decode_error_reasons() {
        assert_eq!(DecodeError::Empty.reason(), "empty packet");
        assert_eq!(DecodeError::UnknownCommand(9).reason(), "unknown command");
    }
}
