//! Pre-authored shapes that can be rotated and stamped onto the grid.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{Dot, Location};
use crate::error::{GeometryError, GeometryResult};

/// Rectangular bitmap of a shape, indexed `mask[row][column]`.
///
/// A non-zero cell marks a dot of the shape. Every transform returns a new
/// mask; the receiver is never modified.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<u8>>", into = "Vec<Vec<u8>>")]
pub struct DotsMask {
    mask: Vec<Vec<u8>>,
}

impl DotsMask {
    /// Creates a mask from rows.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidMask`] if there are no rows, a row is
    /// empty, rows differ in length, or a side exceeds 255 cells.
    pub fn new(mask: Vec<Vec<u8>>) -> GeometryResult<Self> {
        let Some(first) = mask.first() else {
            return Err(GeometryError::InvalidMask("mask has no rows".to_string()));
        };
        let width = first.len();
        if width == 0 {
            return Err(GeometryError::InvalidMask("mask has an empty row".to_string()));
        }
        if mask.iter().any(|row| row.len() != width) {
            return Err(GeometryError::InvalidMask("mask rows differ in length".to_string()));
        }
        if width > usize::from(u8::MAX) || mask.len() > usize::from(u8::MAX) {
            return Err(GeometryError::InvalidMask(format!(
                "mask {width}x{} exceeds 255 cells per side",
                mask.len()
            )));
        }
        Ok(Self { mask })
    }

    /// Number of columns.
    #[allow(clippy::cast_possible_truncation)]
    #[must_use]
    pub fn width(&self) -> u8 {
        // Bounded by `new`
        self.mask[0].len() as u8
    }

    /// Number of rows.
    #[allow(clippy::cast_possible_truncation)]
    #[must_use]
    pub fn height(&self) -> u8 {
        self.mask.len() as u8
    }

    /// Raw rows.
    #[must_use]
    pub fn rows(&self) -> &[Vec<u8>] {
        &self.mask
    }

    /// Number of set cells.
    #[must_use]
    pub fn dot_count(&self) -> usize {
        self.mask.iter().flatten().filter(|cell| **cell != 0).count()
    }

    /// Stamps the mask with its top-left corner at `(x, y)`.
    ///
    /// Cells that would land past coordinate 255 are dropped.
    #[must_use]
    pub fn location(&self, x: u8, y: u8) -> Location {
        let mut location = Location::default();
        for (dy, row) in self.mask.iter().enumerate() {
            for (dx, cell) in row.iter().enumerate() {
                if *cell == 0 {
                    continue;
                }
                let dot = u8::try_from(dx)
                    .ok()
                    .and_then(|dx| x.checked_add(dx))
                    .zip(u8::try_from(dy).ok().and_then(|dy| y.checked_add(dy)));
                if let Some((dot_x, dot_y)) = dot {
                    location.add(Dot::new(dot_x, dot_y));
                }
            }
        }
        location
    }

    /// Rotates 90 degrees counter-clockwise.
    #[must_use]
    pub fn turn_left(&self) -> Self {
        let (width, height) = (self.mask[0].len(), self.mask.len());
        let mut turned = vec![vec![0; height]; width];
        for (y, row) in self.mask.iter().enumerate() {
            for (x, cell) in row.iter().enumerate() {
                turned[width - 1 - x][y] = *cell;
            }
        }
        Self { mask: turned }
    }

    /// Rotates 90 degrees clockwise.
    #[must_use]
    pub fn turn_right(&self) -> Self {
        let (width, height) = (self.mask[0].len(), self.mask.len());
        let mut turned = vec![vec![0; height]; width];
        for (y, row) in self.mask.iter().enumerate() {
            for (x, cell) in row.iter().enumerate() {
                turned[x][height - 1 - y] = *cell;
            }
        }
        Self { mask: turned }
    }

    /// Rotates 180 degrees.
    #[must_use]
    pub fn turn_over(&self) -> Self {
        let mask = self
            .mask
            .iter()
            .rev()
            .map(|row| row.iter().rev().copied().collect())
            .collect();
        Self { mask }
    }

    /// Mirrors across the vertical axis: columns swap left and right.
    #[must_use]
    pub fn mirror_horizontal(&self) -> Self {
        let mask = self
            .mask
            .iter()
            .map(|row| row.iter().rev().copied().collect())
            .collect();
        Self { mask }
    }

    /// Mirrors across the horizontal axis: rows swap top and bottom.
    #[must_use]
    pub fn mirror_vertical(&self) -> Self {
        let mask = self.mask.iter().rev().cloned().collect();
        Self { mask }
    }

    /// Returns the mask in one of its four rotations, chosen uniformly.
    /// Never mirrors, so a chiral shape keeps its handedness.
    pub fn turn_random<R: Rng + ?Sized>(&self, rng: &mut R) -> Self {
        match rng.gen_range(0..4) {
            0 => self.clone(),
            1 => self.turn_left(),
            2 => self.turn_right(),
            _ => self.turn_over(),
        }
    }

    /// Solid 2x2 block.
    #[must_use]
    pub fn square_2x2() -> Self {
        Self::from_static(&[&[1, 1], &[1, 1]])
    }

    /// Plus sign.
    #[must_use]
    pub fn cross() -> Self {
        Self::from_static(&[&[0, 1, 0], &[1, 1, 1], &[0, 1, 0]])
    }

    /// Three-cell diagonal.
    #[must_use]
    pub fn diagonal() -> Self {
        Self::from_static(&[&[1, 0, 0], &[0, 1, 0], &[0, 0, 1]])
    }

    /// Tank hull with its gun pointing north.
    #[must_use]
    pub fn tank() -> Self {
        Self::from_static(&[&[0, 1, 0], &[1, 1, 1], &[1, 0, 1]])
    }

    /// Square outline with an open doorway at the bottom.
    #[must_use]
    pub fn home() -> Self {
        Self::from_static(&[
            &[1, 1, 1, 1, 1],
            &[1, 0, 0, 0, 1],
            &[1, 0, 0, 0, 1],
            &[1, 1, 0, 1, 1],
        ])
    }

    fn from_static(rows: &[&[u8]]) -> Self {
        Self {
            mask: rows.iter().map(|row| row.to_vec()).collect(),
        }
    }
}

impl TryFrom<Vec<Vec<u8>>> for DotsMask {
    type Error = GeometryError;

    fn try_from(mask: Vec<Vec<u8>>) -> GeometryResult<Self> {
        Self::new(mask)
    }
}

impl From<DotsMask> for Vec<Vec<u8>> {
    fn from(mask: DotsMask) -> Self {
        mask.mask
    }
}
