//! Axis-aligned rectangles.

use serde::{Deserialize, Serialize};

use super::{Dot, Location};
use crate::error::{GeometryError, GeometryResult};

/// Rectangle whose top-left corner is `(x, y)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    x: u8,
    y: u8,
    width: u8,
    height: u8,
}

impl Rect {
    /// Creates a rectangle with positive sides that stays inside the 8-bit
    /// coordinate range.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidRect`] otherwise.
    pub fn new(x: u8, y: u8, width: u8, height: u8) -> GeometryResult<Self> {
        let fits = u16::from(x) + u16::from(width) <= 256 && u16::from(y) + u16::from(height) <= 256;
        if width == 0 || height == 0 || !fits {
            return Err(GeometryError::InvalidRect { x, y, width, height });
        }
        Ok(Self { x, y, width, height })
    }

    /// Left column.
    #[inline]
    #[must_use]
    pub const fn x(&self) -> u8 {
        self.x
    }

    /// Top row.
    #[inline]
    #[must_use]
    pub const fn y(&self) -> u8 {
        self.y
    }

    /// Number of columns.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> u8 {
        self.width
    }

    /// Number of rows.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> u8 {
        self.height
    }

    /// Top-left dot.
    #[must_use]
    pub const fn origin(&self) -> Dot {
        Dot::new(self.x, self.y)
    }

    /// Returns true if `dot` lies inside the rectangle.
    #[must_use]
    pub fn contains_dot(&self, dot: Dot) -> bool {
        dot.x >= self.x
            && dot.y >= self.y
            && u16::from(dot.x) < u16::from(self.x) + u16::from(self.width)
            && u16::from(dot.y) < u16::from(self.y) + u16::from(self.height)
    }

    /// Every dot of the rectangle, row by row.
    #[must_use]
    pub fn location(&self) -> Location {
        (0..self.height)
            .flat_map(|dy| (0..self.width).map(move |dx| Dot::new(self.x + dx, self.y + dy)))
            .collect()
    }

    /// Rectangle grown by `margin` on every side, or `None` if it would
    /// leave the 8-bit coordinate range.
    #[must_use]
    pub fn expand(&self, margin: u8) -> Option<Self> {
        let x = self.x.checked_sub(margin)?;
        let y = self.y.checked_sub(margin)?;
        let width = self.width.checked_add(margin)?.checked_add(margin)?;
        let height = self.height.checked_add(margin)?.checked_add(margin)?;
        Self::new(x, y, width, height).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_validates() {
        assert!(Rect::new(0, 0, 0, 1).is_err());
        assert!(Rect::new(250, 0, 7, 1).is_err());
        assert!(Rect::new(250, 0, 6, 1).is_ok());
    }

    #[test]
    fn test_location_row_major() {
        let rect = Rect::new(2, 3, 2, 2).unwrap();
        assert_eq!(
            rect.location().dots(),
            &[Dot::new(2, 3), Dot::new(3, 3), Dot::new(2, 4), Dot::new(3, 4)]
        );
    }

    #[test]
    fn test_location_at_coordinate_limit() {
        let rect = Rect::new(254, 254, 2, 2).unwrap();
        assert_eq!(rect.location().dot_count(), 4);
        assert!(rect.contains_dot(Dot::new(255, 255)));
    }

    #[test]
    fn test_contains_dot() {
        let rect = Rect::new(2, 2, 3, 3).unwrap();
        assert!(rect.contains_dot(Dot::new(2, 2)));
        assert!(rect.contains_dot(Dot::new(4, 4)));
        assert!(!rect.contains_dot(Dot::new(5, 4)));
        assert!(!rect.contains_dot(Dot::new(1, 3)));
    }

    #[test]
    fn test_expand() {
        let rect = Rect::new(2, 2, 3, 3).unwrap();
        assert_eq!(rect.expand(1), Some(Rect::new(1, 1, 5, 5).unwrap()));
        assert_eq!(rect.expand(3), None);
    }
}
