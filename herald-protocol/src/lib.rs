//! Notification Characteristic Protocol
//!
//! This crate defines the wire protocol between the companion phone app and
//! the Herald receiver. The phone writes messages to a single GATT
//! characteristic; long messages arrive as several offset-addressed writes.
//!
//! # Protocol Overview
//!
//! ```text
//! ┌─────┬──────────────────────────────┐
//! │ TAG │ PAYLOAD (command specific)   │
//! │ 1B  │ 0–511B                       │
//! └─────┴──────────────────────────────┘
//! ```
//!
//! There is no length prefix and no checksum: the link layer already provides
//! integrity, and message boundaries come from the write offsets (see
//! [`assembly`]).
//!
//! The [`bridge`] module carries the same traffic between the host MCU and a
//! BLE coprocessor over a serial line, where framing and a checksum are
//! needed.

#![no_std]
#![deny(unsafe_code)]

pub mod assembly;
pub mod bridge;
pub mod category;
pub mod command;

pub use assembly::{Framing, Message, OverflowError, Reassembler, MAX_CHUNK_SIZE, MAX_MESSAGE_SIZE};
pub use category::NotificationCategory;
pub use command::{
    clamp_str, clamped, AppName, Body, Command, DecodeError, EncodeError, NotificationPayload,
    Title, APP_NAME_CAPACITY, BODY_CAPACITY, TITLE_CAPACITY,
};
