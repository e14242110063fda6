//! # Geometry Error Types
//!
//! All errors raised while building or navigating geometry. Every one of
//! them is a validation error.

use arena_core::ErrorKind;
use thiserror::Error;

use crate::geometry::Dot;

/// Errors that can occur when building or using geometry values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeometryError {
    /// Area with a zero side.
    #[error("invalid area {width}x{height}: both sides must be positive")]
    InvalidArea {
        /// Requested width.
        width: u8,
        /// Requested height.
        height: u8,
    },

    /// Rectangle with a zero side or running past the 8-bit coordinate range.
    #[error("invalid rect {width}x{height} at ({x}, {y})")]
    InvalidRect {
        /// Left column.
        x: u8,
        /// Top row.
        y: u8,
        /// Requested width.
        width: u8,
        /// Requested height.
        height: u8,
    },

    /// Rectangle larger than the area it should be placed in.
    #[error("rect {width}x{height} does not fit area {area_width}x{area_height}")]
    RectDoesNotFit {
        /// Requested width.
        width: u8,
        /// Requested height.
        height: u8,
        /// Area width.
        area_width: u8,
        /// Area height.
        area_height: u8,
    },

    /// Dot outside the area it was used with.
    #[error("dot {dot} is outside area {width}x{height}")]
    DotOutOfArea {
        /// The offending dot.
        dot: Dot,
        /// Area width.
        width: u8,
        /// Area height.
        height: u8,
    },

    /// Unknown direction name or code.
    #[error("invalid direction: {0}")]
    InvalidDirection(String),

    /// Two dots that do not share a row or a column.
    #[error("dots {from} and {to} are not on one line")]
    NotInLine {
        /// Start dot.
        from: Dot,
        /// End dot.
        to: Dot,
    },

    /// Ragged, empty or oversized mask rows.
    #[error("invalid dots mask: {0}")]
    InvalidMask(String),
}

impl GeometryError {
    /// Returns the error classification.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        ErrorKind::Validation
    }
}

/// Result type for geometry operations.
pub type GeometryResult<T> = Result<T, GeometryError>;
