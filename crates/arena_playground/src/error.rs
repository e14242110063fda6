//! # Playground Error Types
//!
//! All errors the spatial store can return. None of them leave partial
//! state behind.

use arena_core::{ErrorKind, ShardedMapError};
use arena_shared::{Area, GeometryError};
use thiserror::Error;

/// Errors that can occur in the spatial store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlaygroundError {
    /// Malformed geometry.
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    /// Operation needs at least one dot.
    #[error("location is empty")]
    EmptyLocation,

    /// Location reaches outside the area.
    #[error("location does not fit area {area}")]
    LocationOutOfArea {
        /// Area of the playground.
        area: Area,
    },

    /// Some requested dot is claimed by another object.
    #[error("location is occupied")]
    LocationOccupied,

    /// None of the requested dots could be claimed.
    #[error("no dots available for object")]
    NoDotsAvailable,

    /// Object is already in the registry.
    #[error("object already registered")]
    ObjectAlreadyRegistered,

    /// Object is not in the registry.
    #[error("object not registered")]
    ObjectNotRegistered,

    /// Random placement found no free spot.
    #[error("no free location found after {attempts} attempts")]
    RetriesExhausted {
        /// Number of placements tried.
        attempts: u32,
    },

    /// Occupancy map could not be built.
    #[error(transparent)]
    Storage(#[from] ShardedMapError),

    /// Invalid playground configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl PlaygroundError {
    /// Returns the error classification.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Geometry(_) | Self::EmptyLocation | Self::LocationOutOfArea { .. } => {
                ErrorKind::Validation
            }
            Self::LocationOccupied
            | Self::NoDotsAvailable
            | Self::ObjectAlreadyRegistered
            | Self::ObjectNotRegistered => ErrorKind::Conflict,
            Self::RetriesExhausted { .. } => ErrorKind::RetriesExhausted,
            Self::Storage(_) | Self::InvalidConfig(_) => ErrorKind::Configuration,
        }
    }
}

/// Result type for spatial store operations.
pub type PlaygroundResult<T> = Result<T, PlaygroundError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        let geometry = PlaygroundError::from(GeometryError::InvalidArea { width: 0, height: 1 });
        assert_eq!(geometry.kind(), ErrorKind::Validation);
        assert_eq!(PlaygroundError::LocationOccupied.kind(), ErrorKind::Conflict);
        assert_eq!(
            PlaygroundError::RetriesExhausted { attempts: 3 }.kind(),
            ErrorKind::RetriesExhausted
        );
        assert_eq!(
            PlaygroundError::from(ShardedMapError::InvalidShardCount(0)).kind(),
            ErrorKind::Configuration
        );
    }
}
