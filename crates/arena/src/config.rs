//! World configuration, loaded once at startup.
//!
//! ```toml
//! width = 64
//! height = 48
//!
//! [playground]
//! shard_count = 32
//! placement_retries = 64
//! seed = 7
//!
//! [broadcast]
//! ingress_capacity = 64
//! relay_capacity = 128
//! send_timeout_ms = 100
//! ```
//!
//! Every key is optional.

use std::path::Path;

use arena_broadcast::BroadcastConfig;
use arena_playground::PlaygroundConfig;
use arena_shared::Area;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Everything needed to build a [`World`](crate::World).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Area width.
    pub width: u8,
    /// Area height.
    pub height: u8,
    /// Spatial store settings.
    pub playground: PlaygroundConfig,
    /// Event fan-out settings.
    pub broadcast: BroadcastConfig,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 100,
            height: 100,
            playground: PlaygroundConfig::default(),
            broadcast: BroadcastConfig::default(),
        }
    }
}

impl WorldConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] or [`ConfigError::Invalid`].
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`Self::from_toml_str`].
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&text)
    }

    /// Checks every value.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] naming the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.area()?;
        self.playground.validate()?;
        self.broadcast.validate()?;
        Ok(())
    }

    /// The configured area.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] for a zero side.
    pub fn area(&self) -> Result<Area, ConfigError> {
        Ok(Area::new(self.width, self.height)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(WorldConfig::from_toml_str("").unwrap(), WorldConfig::default());
    }

    #[test]
    fn test_full_document() {
        let config = WorldConfig::from_toml_str(
            r"
            width = 64
            height = 48

            [playground]
            shard_count = 8
            seed = 7

            [broadcast]
            send_timeout_ms = 250
            ",
        )
        .unwrap();

        assert_eq!(config.area().unwrap(), Area::new(64, 48).unwrap());
        assert_eq!(config.playground.shard_count, 8);
        assert_eq!(config.playground.seed, 7);
        assert_eq!(config.playground.placement_retries, 64);
        assert_eq!(config.broadcast.send_timeout_ms, 250);
        assert_eq!(config.broadcast.relay_capacity, 128);
    }

    #[test]
    fn test_invalid_values() {
        let err = WorldConfig::from_toml_str("width = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = WorldConfig::from_toml_str("[playground]\nshard_count = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = WorldConfig::from_toml_str("[broadcast]\nrelay_capacity = 0").unwrap_err();
        assert_eq!(err.kind(), arena_core::ErrorKind::Configuration);
    }

    #[test]
    fn test_malformed_document() {
        let err = WorldConfig::from_toml_str("width = \"wide\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(WorldConfig::from_toml_str("width = 300").is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = WorldConfig::from_toml_file("/nonexistent/arena.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
