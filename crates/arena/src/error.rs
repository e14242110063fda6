//! # World Error Types

use arena_broadcast::BroadcastError;
use arena_core::ErrorKind;
use arena_playground::PlaygroundError;
use arena_shared::GeometryError;
use thiserror::Error;

/// Errors raised while loading a [`WorldConfig`](crate::WorldConfig).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("failed to read config file {path}: {message}")]
    Io {
        /// Path of the file.
        path: String,
        /// Underlying I/O error.
        message: String,
    },

    /// Config text is not valid TOML for this schema.
    #[error("failed to parse config: {0}")]
    Parse(String),

    /// A value is out of range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    /// Returns the error classification.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        ErrorKind::Configuration
    }
}

impl From<GeometryError> for ConfigError {
    fn from(err: GeometryError) -> Self {
        Self::Invalid(err.to_string())
    }
}

impl From<PlaygroundError> for ConfigError {
    fn from(err: PlaygroundError) -> Self {
        Self::Invalid(err.to_string())
    }
}

impl From<BroadcastError> for ConfigError {
    fn from(err: BroadcastError) -> Self {
        Self::Invalid(err.to_string())
    }
}

/// Errors returned by [`World`](crate::World) calls.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorldError {
    /// The spatial store rejected the call.
    #[error(transparent)]
    Playground(#[from] PlaygroundError),

    /// The event pipeline could not be built.
    #[error(transparent)]
    Broadcast(#[from] BroadcastError),

    /// Invalid world configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl WorldError {
    /// Returns the error classification.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Playground(err) => err.kind(),
            Self::Broadcast(err) => err.kind(),
            Self::Config(err) => err.kind(),
        }
    }
}

/// Result type for world operations.
pub type WorldResult<T> = Result<T, WorldError>;
