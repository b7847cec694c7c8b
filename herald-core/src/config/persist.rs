//! Configuration persistence
//!
//! The engine configuration is stored as a postcard blob prefixed by a
//! version number. Where the blob lives (flash sector, EEPROM page, host
//! file) is up to the caller.

use serde::{Deserialize, Serialize};

use super::types::{ConfigInvalid, EngineConfig};

/// Current layout version of [`StoredConfig`]
pub const CONFIG_VERSION: u8 = 1;

/// Upper bound on the serialized size of a [`StoredConfig`]
pub const MAX_STORED_CONFIG_SIZE: usize = 64;

/// Configuration persistence errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Output buffer too small, or serialization failed
    Serialize,
    /// Stored bytes are not a valid config
    Deserialize,
    /// Stored config was written by a different layout version
    VersionMismatch { found: u8, expected: u8 },
    /// Stored config decoded but failed validation
    Invalid(ConfigInvalid),
}

impl From<ConfigInvalid> for ConfigError {
    fn from(e: ConfigInvalid) -> Self {
        ConfigError::Invalid(e)
    }
}

impl From<postcard::Error> for ConfigError {
    fn from(e: postcard::Error) -> Self {
        match e {
            postcard::Error::SerializeBufferFull => ConfigError::Serialize,
            _ => ConfigError::Deserialize,
        }
    }
}

/// Versioned envelope written to storage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredConfig {
    pub version: u8,
    pub engine: EngineConfig,
}

impl StoredConfig {
    pub fn new(engine: EngineConfig) -> Self {
        Self {
            version: CONFIG_VERSION,
            engine,
        }
    }
}

/// Serialize `config` into `buf`, returning the used prefix
pub fn save<'a>(config: &EngineConfig, buf: &'a mut [u8]) -> Result<&'a mut [u8], ConfigError> {
    config.validate()?;
    let used = postcard::to_slice(&StoredConfig::new(*config), buf)?;
    debug!("Saved config ({} bytes)", used.len());
    Ok(used)
}

/// Deserialize and validate a stored config
pub fn load(bytes: &[u8]) -> Result<EngineConfig, ConfigError> {
    let stored: StoredConfig = postcard::from_bytes(bytes)?;

    if stored.version != CONFIG_VERSION {
        warn!(
            "Config version mismatch: found {}, expected {}",
            stored.version,
            CONFIG_VERSION
        );
        return Err(ConfigError::VersionMismatch {
            found: stored.version,
            expected: CONFIG_VERSION,
        });
    }

    stored.engine.validate()?;
    Ok(stored.engine)
}

/// Load a stored config, falling back to defaults when it is missing or bad
pub fn load_or_default(bytes: Option<&[u8]>) -> EngineConfig {
    match bytes.map(load) {
        Some(Ok(config)) => config,
        Some(Err(e)) => {
            warn!("Stored config rejected ({}), using defaults", e.reason());
            EngineConfig::default()
        }
        None => EngineConfig::default(),
    }
}

impl ConfigError {
    /// Human-readable reason for error reporting
    pub fn reason(&self) -> &'static str {
        match self {
            ConfigError::Serialize => "config serialization failed",
            ConfigError::Deserialize => "stored config unreadable",
            ConfigError::VersionMismatch { .. } => "stored config version mismatch",
            ConfigError::Invalid(_) => "stored config invalid",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DeletePreview, OverflowPolicy};
    use crate::link::SecurityLevel;

    #[test]
    fn test_save_then_load() {
        let config = EngineConfig {
            delete_timeout_ticks: 30,
            delete_preview: DeletePreview::AdvanceCursor,
            overflow_policy: OverflowPolicy::RejectWrite,
            required_security: SecurityLevel::L4,
            weak_signal_rssi_dbm: -90,
            ..EngineConfig::default()
        };

        let mut buf = [0u8; MAX_STORED_CONFIG_SIZE];
        let used = save(&config, &mut buf).unwrap();
        assert_eq!(load(used), Ok(config));
    }

    #[test]
    fn test_version_mismatch() {
        let stored = StoredConfig {
            version: CONFIG_VERSION + 1,
            engine: EngineConfig::default(),
        };
        let mut buf = [0u8; MAX_STORED_CONFIG_SIZE];
        let used = postcard::to_slice(&stored, &mut buf).unwrap();

        assert_eq!(
            load(used),
            Err(ConfigError::VersionMismatch {
                found: CONFIG_VERSION + 1,
                expected: CONFIG_VERSION
            })
        );
    }

    #[test]
    fn test_garbage_falls_back_to_defaults() {
        assert_eq!(load(&[]), Err(ConfigError::Deserialize));
        assert_eq!(load_or_default(Some(&[0xFF])), EngineConfig::default());
        assert_eq!(load_or_default(None), EngineConfig::default());
    }

    #[test]
    fn test_save_rejects_invalid_config() {
        let config = EngineConfig {
            tick_interval_ms: 0,
            ..EngineConfig::default()
        };
        let mut buf = [0u8; MAX_STORED_CONFIG_SIZE];
        assert_eq!(
            save(&config, &mut buf),
            Err(ConfigError::Invalid(ConfigInvalid::ZeroTickInterval))
        );
    }

    #[test]
    fn test_small_buffer() {
        let mut buf = [0u8; 2];
        assert_eq!(
            save(&EngineConfig::default(), &mut buf),
            Err(ConfigError::Serialize)
        );
    }
}
