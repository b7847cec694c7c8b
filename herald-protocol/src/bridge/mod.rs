//! Serial bridge to a BLE coprocessor
//!
//! Boards without a radio of their own run the BLE stack on a coprocessor
//! connected over UART. The coprocessor forwards GATT and connection events
//! as [`RadioEvent`]s and executes [`HostCommand`]s; both travel in
//! checksummed [`Frame`]s.

pub mod frame;
pub mod messages;

pub use frame::{Frame, FrameError, FrameParser, FRAME_START, MAX_FRAME_SIZE, MAX_PAYLOAD_SIZE};
pub use messages::{HostCommand, RadioEvent, ATT_ERROR_INSUFFICIENT_ENCRYPTION, ATT_ERROR_INVALID_OFFSET, ATT_SUCCESS};
