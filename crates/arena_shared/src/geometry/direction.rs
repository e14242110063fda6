//! Compass directions on the grid.

use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::Dot;
use crate::error::{GeometryError, GeometryResult};

/// One of the four grid directions. North is towards row 0.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Towards row 0.
    North = 0,
    /// Towards the last column.
    East = 1,
    /// Towards the last row.
    South = 2,
    /// Towards column 0.
    West = 3,
}

impl Direction {
    /// Every direction, clockwise from North.
    pub const ALL: [Self; 4] = [Self::North, Self::East, Self::South, Self::West];

    /// Returns the opposite direction.
    #[must_use]
    pub const fn reverse(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::East => Self::West,
            Self::South => Self::North,
            Self::West => Self::East,
        }
    }

    /// Picks a direction uniformly at random.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    /// Direction leading from `from` to `to`, ignoring wrap-around.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::NotInLine`] if the dots are equal or share
    /// neither a row nor a column.
    pub fn between(from: Dot, to: Dot) -> GeometryResult<Self> {
        match (from.x == to.x, from.y == to.y) {
            (true, false) if to.y < from.y => Ok(Self::North),
            (true, false) => Ok(Self::South),
            (false, true) if to.x < from.x => Ok(Self::West),
            (false, true) => Ok(Self::East),
            _ => Err(GeometryError::NotInLine { from, to }),
        }
    }

    /// Lowercase name, as used on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::North => "north",
            Self::East => "east",
            Self::South => "south",
            Self::West => "west",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<u8> for Direction {
    type Error = GeometryError;

    fn try_from(code: u8) -> GeometryResult<Self> {
        match code {
            0 => Ok(Self::North),
            1 => Ok(Self::East),
            2 => Ok(Self::South),
            3 => Ok(Self::West),
            other => Err(GeometryError::InvalidDirection(format!("code {other}"))),
        }
    }
}

impl FromStr for Direction {
    type Err = GeometryError;

    fn from_str(s: &str) -> GeometryResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "north" | "n" => Ok(Self::North),
            "east" | "e" => Ok(Self::East),
            "south" | "s" => Ok(Self::South),
            "west" | "w" => Ok(Self::West),
            _ => Err(GeometryError::InvalidDirection(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_reverse_is_involution() {
        for direction in Direction::ALL {
            assert_ne!(direction.reverse(), direction);
            assert_eq!(direction.reverse().reverse(), direction);
        }
    }

    #[test]
    fn test_parse() {
        assert_eq!("North".parse::<Direction>().unwrap(), Direction::North);
        assert_eq!("w".parse::<Direction>().unwrap(), Direction::West);

        let err = "up".parse::<Direction>().unwrap_err();
        assert_eq!(err, GeometryError::InvalidDirection("up".to_string()));
        assert_eq!(err.kind(), crate::ErrorKind::Validation);
    }

    #[test]
    fn test_code_round_trip() {
        for direction in Direction::ALL {
            assert_eq!(Direction::try_from(direction as u8).unwrap(), direction);
        }
        assert!(Direction::try_from(4).is_err());
    }

    #[test]
    fn test_between() {
        let origin = Dot::new(5, 5);
        assert_eq!(Direction::between(origin, Dot::new(5, 1)).unwrap(), Direction::North);
        assert_eq!(Direction::between(origin, Dot::new(9, 5)).unwrap(), Direction::East);
        assert_eq!(Direction::between(origin, Dot::new(5, 6)).unwrap(), Direction::South);
        assert_eq!(Direction::between(origin, Dot::new(0, 5)).unwrap(), Direction::West);
        assert!(Direction::between(origin, origin).is_err());
        assert!(Direction::between(origin, Dot::new(6, 6)).is_err());
    }

    #[test]
    fn test_random_covers_all() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut seen = [false; 4];
        for _ in 0..200 {
            seen[Direction::random(&mut rng) as usize] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&Direction::East).unwrap(), r#""east""#);
        let parsed: Direction = serde_json::from_str(r#""south""#).unwrap();
        assert_eq!(parsed, Direction::South);
        assert!(serde_json::from_str::<Direction>(r#""up""#).is_err());
    }
}
