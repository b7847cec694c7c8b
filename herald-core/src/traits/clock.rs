//! Wall-clock trait

/// Errors that can occur setting the clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockError {
    /// Clock device did not respond
    Unavailable,
    /// Timestamp outside the range the device can hold
    OutOfRange,
}

impl ClockError {
    pub fn reason(&self) -> &'static str {
        match self {
            ClockError::Unavailable => "clock unavailable",
            ClockError::OutOfRange => "timestamp out of range",
        }
    }
}

/// Trait for the real-time clock
pub trait Clock {
    /// Set the current time (Unix epoch seconds, UTC)
    fn set_time(&mut self, unix_timestamp: u32) -> Result<(), ClockError>;

    /// Current time, or `None` if the clock was never set
    fn now(&self) -> Option<u32>;
}
