//! Configuration type definitions

use crate::link::SecurityLevel;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// What the engine does with a partial message when a write overflows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OverflowPolicy {
    /// Drop everything buffered so far
    #[default]
    ResetBuffer,
    /// Reject only the offending write, keep what was buffered
    RejectWrite,
}

/// Cursor behaviour while a deletion is pending
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DeletePreview {
    /// Cursor stays on the item being deleted
    #[default]
    KeepCursor,
    /// Cursor moves on to the next item; undo moves it back
    AdvanceCursor,
}

/// Engine configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EngineConfig {
    /// Ticks a pending deletion waits before it is applied
    pub delete_timeout_ticks: u16,
    /// Period of [`Engine::tick`](crate::Engine::tick) in milliseconds
    pub tick_interval_ms: u32,
    /// How often the clock text is re-published
    pub clock_refresh_ms: u32,
    /// How often the store is re-published so relative times re-render
    pub relative_time_refresh_ms: u32,
    /// Quiet ticks after which a buffered message is treated as complete
    ///
    /// Zero disables idle completion; messages then complete only on the
    /// next offset-0 write.
    pub assembly_idle_ticks: u8,
    pub overflow_policy: OverflowPolicy,
    pub delete_preview: DeletePreview,
    /// Security level the link must reach before commands are accepted
    pub required_security: SecurityLevel,
    /// RSSI below this reports a weak signal while paired (dBm)
    pub weak_signal_rssi_dbm: i8,
    /// Cancel a pending deletion when the peer disconnects
    pub cancel_delete_on_disconnect: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            delete_timeout_ticks: 20,
            tick_interval_ms: 100,
            clock_refresh_ms: 60_000,
            relative_time_refresh_ms: 30_000,
            assembly_idle_ticks: 2,
            overflow_policy: OverflowPolicy::ResetBuffer,
            delete_preview: DeletePreview::KeepCursor,
            required_security: SecurityLevel::L2,
            weak_signal_rssi_dbm: -80,
            cancel_delete_on_disconnect: false,
        }
    }
}

/// Reasons a configuration is rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigInvalid {
    ZeroTickInterval,
    ZeroDeleteTimeout,
    ZeroClockRefresh,
    ZeroRelativeTimeRefresh,
}

impl EngineConfig {
    /// Check the configuration for values the engine cannot run with
    pub fn validate(&self) -> Result<(), ConfigInvalid> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigInvalid::ZeroTickInterval);
        }
        if self.delete_timeout_ticks == 0 {
            return Err(ConfigInvalid::ZeroDeleteTimeout);
        }
        if self.clock_refresh_ms == 0 {
            return Err(ConfigInvalid::ZeroClockRefresh);
        }
        if self.relative_time_refresh_ms == 0 {
            return Err(ConfigInvalid::ZeroRelativeTimeRefresh);
        }
        Ok(())
    }

    /// Convert a period in milliseconds to a whole number of ticks (at least one)
    pub fn ms_to_ticks(&self, ms: u32) -> u32 {
        if self.tick_interval_ms == 0 {
            return 1;
        }
        (ms / self.tick_interval_ms).max(1)
    }

    /// Ticks between clock refreshes
    pub fn clock_refresh_ticks(&self) -> u32 {
        self.ms_to_ticks(self.clock_refresh_ms)
    }

    /// Ticks between relative-time refreshes
    pub fn relative_time_refresh_ticks(&self) -> u32 {
        self.ms_to_ticks(self.relative_time_refresh_ms)
    }
}
