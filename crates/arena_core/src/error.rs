//! # Core Error Types
//!
//! The error taxonomy shared by every arena crate, plus the errors raised by
//! the sharded map itself.

use thiserror::Error;

/// Coarse classification of every error the arena core can return.
///
/// Callers at the transport layer only need this to decide between
/// "reject the request" and "try elsewhere/later".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed input: zero-area, out-of-bounds geometry, empty location.
    Validation,
    /// Requested dots are taken, or the object is already/never registered.
    Conflict,
    /// A bounded randomized search ran out of attempts.
    RetriesExhausted,
    /// Invalid construction parameters.
    Configuration,
    /// The event pipeline is stopped or did not accept an event in time.
    Unavailable,
}

impl ErrorKind {
    /// Returns true if the same request may succeed when retried later.
    #[inline]
    #[must_use]
    pub const fn is_retriable(self) -> bool {
        matches!(self, Self::Conflict | Self::RetriesExhausted)
    }
}

/// Errors that can occur when building a sharded map.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShardedMapError {
    /// The map needs at least one shard.
    #[error("invalid shard count {0}: at least one shard is required")]
    InvalidShardCount(usize),
}

impl ShardedMapError {
    /// Returns the error classification.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidShardCount(_) => ErrorKind::Configuration,
        }
    }
}

/// Result type for sharded map construction.
pub type ShardedMapResult<T> = Result<T, ShardedMapError>;
