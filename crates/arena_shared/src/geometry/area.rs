//! The bounded, wrapping playing field.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{Direction, Dot, Location, Rect};
use crate::error::{GeometryError, GeometryResult};

/// Width x height of the world. Both sides are positive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawArea", into = "RawArea")]
pub struct Area {
    width: u8,
    height: u8,
}

/// Unvalidated wire shape of [`Area`].
#[derive(Serialize, Deserialize)]
struct RawArea {
    width: u8,
    height: u8,
}

impl TryFrom<RawArea> for Area {
    type Error = GeometryError;

    fn try_from(raw: RawArea) -> GeometryResult<Self> {
        Self::new(raw.width, raw.height)
    }
}

impl From<Area> for RawArea {
    fn from(area: Area) -> Self {
        Self {
            width: area.width,
            height: area.height,
        }
    }
}

impl Area {
    /// Creates a validated area.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidArea`] if either side is zero.
    pub fn new(width: u8, height: u8) -> GeometryResult<Self> {
        if width == 0 || height == 0 {
            return Err(GeometryError::InvalidArea { width, height });
        }
        Ok(Self { width, height })
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

    /// Number of dots.
    #[inline]
    #[must_use]
    pub fn size(&self) -> u16 {
        u16::from(self.width) * u16::from(self.height)
    }

    /// Returns true if `dot` lies inside the area.
    #[inline]
    #[must_use]
    pub const fn contains(&self, dot: Dot) -> bool {
        dot.x < self.width && dot.y < self.height
    }

    /// Returns true if every dot of `location` lies inside the area.
    ///
    /// An empty location is trivially contained.
    #[must_use]
    pub fn contains_location(&self, location: &Location) -> bool {
        location.iter().all(|dot| self.contains(*dot))
    }

    /// Returns true if the whole rectangle lies inside the area.
    #[must_use]
    pub fn contains_rect(&self, rect: &Rect) -> bool {
        u16::from(rect.x()) + u16::from(rect.width()) <= u16::from(self.width)
            && u16::from(rect.y()) + u16::from(rect.height()) <= u16::from(self.height)
    }

    /// Samples a dot uniformly from the area.
    pub fn new_random_dot<R: Rng + ?Sized>(&self, rng: &mut R) -> Dot {
        Dot::new(rng.gen_range(0..self.width), rng.gen_range(0..self.height))
    }

    /// Samples a `width` x `height` rectangle uniformly from every position
    /// where it fits entirely inside the area.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidRect`] for a zero side and
    /// [`GeometryError::RectDoesNotFit`] if the rectangle is larger than the
    /// area.
    pub fn new_random_rect<R: Rng + ?Sized>(
        &self,
        width: u8,
        height: u8,
        rng: &mut R,
    ) -> GeometryResult<Rect> {
        if width == 0 || height == 0 {
            return Err(GeometryError::InvalidRect { x: 0, y: 0, width, height });
        }
        if width > self.width || height > self.height {
            return Err(GeometryError::RectDoesNotFit {
                width,
                height,
                area_width: self.width,
                area_height: self.height,
            });
        }

        let x = rng.gen_range(0..=self.width - width);
        let y = rng.gen_range(0..=self.height - height);
        Rect::new(x, y, width, height)
    }

    /// Steps `distance` dots from `dot` towards `direction`, wrapping around
    /// the edges.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::DotOutOfArea`] if `dot` is not inside the
    /// area; navigation is only defined from valid starting points.
    pub fn navigate(&self, dot: Dot, direction: Direction, distance: u8) -> GeometryResult<Dot> {
        if !self.contains(dot) {
            return Err(GeometryError::DotOutOfArea {
                dot,
                width: self.width,
                height: self.height,
            });
        }

        let navigated = match direction {
            Direction::North => Dot::new(dot.x, wrap_back(dot.y, distance, self.height)),
            Direction::South => Dot::new(dot.x, wrap_forward(dot.y, distance, self.height)),
            Direction::East => Dot::new(wrap_forward(dot.x, distance, self.width), dot.y),
            Direction::West => Dot::new(wrap_back(dot.x, distance, self.width), dot.y),
        };

        Ok(navigated)
    }
}

/// `(coord + distance) mod side`, with `coord < side`.
#[allow(clippy::cast_possible_truncation)]
fn wrap_forward(coord: u8, distance: u8, side: u8) -> u8 {
    let side = u16::from(side);
    // Result is below side, which fits u8
    ((u16::from(coord) + u16::from(distance) % side) % side) as u8
}

/// `(coord - distance) mod side`, with `coord < side`.
#[allow(clippy::cast_possible_truncation)]
fn wrap_back(coord: u8, distance: u8, side: u8) -> u8 {
    let side = u16::from(side);
    ((u16::from(coord) + side - u16::from(distance) % side) % side) as u8
}

impl std::fmt::Display for Area {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}
