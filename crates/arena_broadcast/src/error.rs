//! # Broadcast Error Types

use arena_core::ErrorKind;
use thiserror::Error;

/// Errors that can occur when publishing events.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BroadcastError {
    /// The broadcaster was closed.
    #[error("broadcaster is stopped")]
    Stopped,

    /// The ingress queue stayed full for the whole send timeout.
    #[error("ingress queue full for {timeout_ms}ms")]
    Timeout {
        /// Send timeout in milliseconds.
        timeout_ms: u64,
    },

    /// The ingress queue had no room for a non-blocking publish.
    #[error("ingress queue full")]
    Full,

    /// Invalid broadcast configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl BroadcastError {
    /// Returns the error classification.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Stopped | Self::Full | Self::Timeout { .. } => ErrorKind::Unavailable,
            Self::InvalidConfig(_) => ErrorKind::Configuration,
        }
    }
}

/// Result type for broadcast operations.
pub type BroadcastResult<T> = Result<T, BroadcastError>;
