//! The cells one object occupies.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::Dot;

/// Ordered sequence of dots occupied by one object.
///
/// Order matters to some objects (a snake runs head to tail) and not to
/// others, so equality ignores it: two locations are equal when their
/// symmetric difference is empty. A location may be empty.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Location(Vec<Dot>);

impl Location {
    /// Creates a location from dots in the given order.
    #[must_use]
    pub fn new(dots: Vec<Dot>) -> Self {
        Self(dots)
    }

    /// Dots in order.
    #[inline]
    #[must_use]
    pub fn dots(&self) -> &[Dot] {
        &self.0
    }

    /// Iterates dots in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Dot> {
        self.0.iter()
    }

    /// Number of dots.
    #[inline]
    #[must_use]
    pub fn dot_count(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the location holds no dots.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Dot at `index`.
    #[must_use]
    pub fn dot(&self, index: usize) -> Option<Dot> {
        self.0.get(index).copied()
    }

    /// Returns true if `dot` is part of the location.
    #[must_use]
    pub fn contains(&self, dot: Dot) -> bool {
        self.0.contains(&dot)
    }

    /// Occupancy keys of every dot, in order.
    #[must_use]
    pub fn hashes(&self) -> Vec<u16> {
        self.0.iter().map(|dot| dot.hash()).collect()
    }

    /// Appends `dot` unless it is already present. Returns true if appended.
    pub fn add(&mut self, dot: Dot) -> bool {
        if self.contains(dot) {
            return false;
        }
        self.0.push(dot);
        true
    }

    /// Removes every occurrence of `dot`. Returns true if anything was
    /// removed.
    pub fn delete(&mut self, dot: Dot) -> bool {
        let before = self.0.len();
        self.0.retain(|d| *d != dot);
        self.0.len() != before
    }

    /// Dots of `self` that are not in `other`, in `self`'s order.
    #[must_use]
    pub fn difference(&self, other: &Self) -> Self {
        let other: HashSet<Dot> = other.0.iter().copied().collect();
        self.0.iter().copied().filter(|dot| !other.contains(dot)).collect()
    }

    /// Dots of `self` that are also in `other`, in `self`'s order.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Self {
        let other: HashSet<Dot> = other.0.iter().copied().collect();
        self.0.iter().copied().filter(|dot| other.contains(dot)).collect()
    }

    /// Order-independent comparison.
    #[must_use]
    pub fn equals(&self, other: &Self) -> bool {
        let left: HashSet<Dot> = self.0.iter().copied().collect();
        let right: HashSet<Dot> = other.0.iter().copied().collect();
        left.symmetric_difference(&right).next().is_none()
    }

    /// Deep copy, taken before handing a location to code that mutates it.
    #[must_use]
    pub fn copy(&self) -> Self {
        Self(self.0.clone())
    }

    /// Same dots in reverse order.
    #[must_use]
    pub fn reverse(&self) -> Self {
        self.0.iter().rev().copied().collect()
    }
}

impl PartialEq for Location {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl Eq for Location {}

impl From<Vec<Dot>> for Location {
    fn from(dots: Vec<Dot>) -> Self {
        Self(dots)
    }
}

impl From<Dot> for Location {
    fn from(dot: Dot) -> Self {
        Self(vec![dot])
    }
}

impl FromIterator<Dot> for Location {
    fn from_iter<I: IntoIterator<Item = Dot>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Location {
    type Item = Dot;
    type IntoIter = std::vec::IntoIter<Dot>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Location {
    type Item = &'a Dot;
    type IntoIter = std::slice::Iter<'a, Dot>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
