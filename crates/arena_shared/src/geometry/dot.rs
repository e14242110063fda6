//! A single grid cell.

use serde::{Deserialize, Serialize};

/// Grid cell coordinate.
///
/// Collapses into a 16-bit key with [`Dot::hash`] (`x << 8 | y`); the
/// mapping is exact in both directions.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Dot {
    /// Column.
    pub x: u8,
    /// Row.
    pub y: u8,
}

impl Dot {
    /// Creates a new dot.
    #[inline]
    #[must_use]
    pub const fn new(x: u8, y: u8) -> Self {
        Self { x, y }
    }

    /// Key of this dot in the occupancy map.
    #[inline]
    #[must_use]
    pub const fn hash(self) -> u16 {
        u16::from_be_bytes([self.x, self.y])
    }

    /// Inverse of [`Dot::hash`].
    #[inline]
    #[must_use]
    pub const fn from_hash(hash: u16) -> Self {
        let [x, y] = hash.to_be_bytes();
        Self { x, y }
    }

    /// Manhattan distance, ignoring wrap-around.
    #[must_use]
    pub fn distance_to(self, other: Self) -> u16 {
        u16::from(self.x.abs_diff(other.x)) + u16::from(self.y.abs_diff(other.y))
    }
}

impl std::fmt::Display for Dot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(u8, u8)> for Dot {
    fn from((x, y): (u8, u8)) -> Self {
        Self::new(x, y)
    }
}
