//! Reassembly of offset-addressed characteristic writes.
//!
//! The peer pushes a message as one or more writes, each carrying the byte
//! offset it belongs at. There is no "last fragment" flag on the wire: a write
//! at offset 0 starts a new message, which means whatever was buffered before
//! it is complete.
//!
//! ```text
//! write(0, A)  write(20, B)  write(40, C)  write(0, D) ...
//! └──────────── message 1 ─────────────┘   └─ message 2
//!                              completed here ┘
//! ```
//!
//! The convention is hidden behind [`Framing`] so a length-prefixed framing
//! can replace it without touching the command decoder.

use heapless::Vec;

/// Maximum assembled message size in bytes
pub const MAX_MESSAGE_SIZE: usize = 512;

/// Largest single write the transport may hand over (ATT MTU ceiling)
pub const MAX_CHUNK_SIZE: usize = 517;

/// A completed message, ready for the command decoder
pub type Message = Vec<u8, MAX_MESSAGE_SIZE>;

/// A write would run past the end of the assembly buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OverflowError {
    /// Offset of the rejected write
    pub offset: u32,
    /// Length of the rejected write
    pub len: usize,
}

impl OverflowError {
    /// Human-readable reason for error reporting
    pub fn reason(&self) -> &'static str {
        "notification buffer overflow"
    }
}

/// Turns a stream of transport writes into complete messages
pub trait Framing {
    /// Accept one write.
    ///
    /// Returns `Ok(Some(message))` when this write completes a message,
    /// `Ok(None)` when more data is expected, or `Err` when the write was
    /// rejected. A rejected write leaves the buffer untouched.
    fn ingest(&mut self, offset: u32, chunk: &[u8]) -> Result<Option<Message>, OverflowError>;

    /// Hand over whatever is buffered as a complete message
    fn finish(&mut self) -> Option<Message>;

    /// Drop any buffered data
    fn reset(&mut self);

    /// Number of bytes buffered (high-water mark)
    fn filled_len(&self) -> usize;

    /// Whether nothing is buffered
    fn is_empty(&self) -> bool {
        self.filled_len() == 0
    }
}

/// Offset-0-completes reassembler over a fixed buffer
#[derive(Debug, Clone)]
pub struct Reassembler {
    buffer: [u8; MAX_MESSAGE_SIZE],
    filled_len: usize,
}

impl Default for Reassembler {
    fn default() -> Self {
        Self::new()
    }
}

impl Reassembler {
    /// Create an empty reassembler
    pub const fn new() -> Self {
        Self {
            buffer: [0u8; MAX_MESSAGE_SIZE],
            filled_len: 0,
        }
    }

    /// Total buffer capacity
    pub const fn capacity(&self) -> usize {
        MAX_MESSAGE_SIZE
    }

    /// Bytes buffered so far
    pub fn buffered(&self) -> &[u8] {
        &self.buffer[..self.filled_len]
    }

    /// Validate a write against the buffer bounds, returning its end offset
    fn check_bounds(offset: u32, len: usize) -> Result<usize, OverflowError> {
        let end = usize::try_from(offset)
            .ok()
            .and_then(|start| start.checked_add(len))
            .ok_or(OverflowError { offset, len })?;

        if end > MAX_MESSAGE_SIZE {
            return Err(OverflowError { offset, len });
        }
        Ok(end)
    }

    fn take(&mut self) -> Option<Message> {
        if self.filled_len == 0 {
            return None;
        }

        let mut message = Message::new();
        // Cannot fail: filled_len never exceeds the message capacity
        let _ = message.extend_from_slice(&self.buffer[..self.filled_len]);
        self.filled_len = 0;
        Some(message)
    }
}

impl Framing for Reassembler {
    fn ingest(&mut self, offset: u32, chunk: &[u8]) -> Result<Option<Message>, OverflowError> {
        // Bounds are checked before anything is copied or flushed
        let end = Self::check_bounds(offset, chunk.len())?;
        let start = end - chunk.len();

        let completed = if start == 0 { self.take() } else { None };

        if start > self.filled_len {
            self.buffer[self.filled_len..start].fill(0);
        }
        self.buffer[start..end].copy_from_slice(chunk);
        self.filled_len = self.filled_len.max(end);

        Ok(completed)
    }

    fn finish(&mut self) -> Option<Message> {
        self.take()
    }

    fn reset(&mut self) {
        self.filled_len = 0;
    }

    fn filled_len(&self) -> usize {
        self.filled_len
    }
}
