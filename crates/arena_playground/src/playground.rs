//! Dot occupancy plus the object registry.

use std::collections::HashSet;
use std::sync::Arc;

use arena_core::ShardedMap;
use arena_shared::{Area, Direction, Dot, DotsMask, GeometryError, Location, Rect};
use parking_lot::Mutex;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::config::PlaygroundConfig;
use crate::error::{PlaygroundError, PlaygroundResult};

/// One sampled placement.
struct Candidate {
    /// Dots to claim.
    location: Location,
    /// Rectangle that must be completely free before claiming.
    clearance: Option<Rect>,
}

impl Candidate {
    fn new(location: Location) -> Self {
        Self {
            location,
            clearance: None,
        }
    }
}

/// Spatial object store.
///
/// Objects are shared handles; two handles are the same object only if they
/// point to the same allocation. Every dot is claimed by at most one object.
///
/// Occupancy is committed before the registry entry and released before the
/// entry is dropped, so readers combining both can see a short window where
/// they disagree.
pub struct Playground<T> {
    area: Area,
    occupancy: ShardedMap<Arc<T>>,
    objects: Mutex<Vec<Arc<T>>>,
    rng: Mutex<ChaCha8Rng>,
    placement_retries: u32,
}

impl<T> Playground<T> {
    /// Creates an empty playground covering `area`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `config` does not validate.
    pub fn new(area: Area, config: &PlaygroundConfig) -> PlaygroundResult<Self> {
        config.validate()?;

        Ok(Self {
            area,
            occupancy: ShardedMap::new(config.shard_count)?,
            objects: Mutex::new(Vec::new()),
            rng: Mutex::new(ChaCha8Rng::seed_from_u64(config.seed)),
            placement_retries: config.placement_retries,
        })
    }

    /// The playing field.
    #[inline]
    #[must_use]
    pub const fn area(&self) -> Area {
        self.area
    }

    // =========================================================================
    // CREATE
    // =========================================================================

    /// Claims every dot of `location` for `object` and registers it.
    ///
    /// # Errors
    ///
    /// - Validation error if `location` is empty or leaves the area
    /// - [`PlaygroundError::ObjectAlreadyRegistered`]
    /// - [`PlaygroundError::LocationOccupied`] if any dot is taken; nothing
    ///   is claimed in that case
    pub fn create_object(&self, object: &Arc<T>, location: &Location) -> PlaygroundResult<()> {
        self.check_location(location)?;
        if self.object_exists(object) {
            return Err(PlaygroundError::ObjectAlreadyRegistered);
        }

        if !self.claim(object, location) {
            return Err(PlaygroundError::LocationOccupied);
        }

        self.register(object, location)
    }

    /// Claims whichever dots of `location` are free and registers `object`
    /// even if none were.
    ///
    /// Returns the claimed dots in `location` order.
    ///
    /// # Errors
    ///
    /// Validation error for an empty or out-of-area location, or
    /// [`PlaygroundError::ObjectAlreadyRegistered`].
    pub fn create_object_available_dots(
        &self,
        object: &Arc<T>,
        location: &Location,
    ) -> PlaygroundResult<Location> {
        self.check_location(location)?;
        if self.object_exists(object) {
            return Err(PlaygroundError::ObjectAlreadyRegistered);
        }

        let claimed: HashSet<u16> = self
            .occupancy
            .mset_if_absent(location.iter().map(|dot| (dot.hash(), Arc::clone(object))))
            .into_iter()
            .collect();
        let achieved: Location = location
            .iter()
            .copied()
            .filter(|dot| claimed.contains(&dot.hash()))
            .collect();

        self.register(object, &achieved)?;
        Ok(achieved)
    }

    /// Places `object` on a random free dot.
    ///
    /// # Errors
    ///
    /// [`PlaygroundError::RetriesExhausted`] if no free dot was hit within
    /// the retry budget, or [`PlaygroundError::ObjectAlreadyRegistered`].
    pub fn create_object_random_dot(&self, object: &Arc<T>) -> PlaygroundResult<Location> {
        let area = self.area;
        self.place(object, |rng| {
            Ok(Candidate::new(Location::from(area.new_random_dot(rng))))
        })
    }

    /// Places `object` on a random free `width` x `height` rectangle.
    ///
    /// # Errors
    ///
    /// Validation error if the rectangle cannot fit the area, otherwise as
    /// [`Self::create_object_random_dot`].
    pub fn create_object_random_rect(
        &self,
        object: &Arc<T>,
        width: u8,
        height: u8,
    ) -> PlaygroundResult<Location> {
        let area = self.area;
        self.place(object, |rng| {
            let rect = area.new_random_rect(width, height, rng)?;
            Ok(Candidate::new(rect.location()))
        })
    }

    /// Places `object` on a random `width` x `height` rectangle surrounded by
    /// a free border `margin` dots wide.
    ///
    /// The border itself stays unclaimed.
    ///
    /// # Errors
    ///
    /// Validation error if the rectangle plus border cannot fit the area,
    /// otherwise as [`Self::create_object_random_dot`].
    pub fn create_object_random_rect_margin(
        &self,
        object: &Arc<T>,
        width: u8,
        height: u8,
        margin: u8,
    ) -> PlaygroundResult<Location> {
        let invalid = || GeometryError::InvalidRect {
            x: 0,
            y: 0,
            width,
            height,
        };
        if width == 0 || height == 0 {
            return Err(invalid().into());
        }
        let outer_width = with_border(width, margin).ok_or_else(invalid)?;
        let outer_height = with_border(height, margin).ok_or_else(invalid)?;

        let area = self.area;
        self.place(object, |rng| {
            let outer = area.new_random_rect(outer_width, outer_height, rng)?;
            let inner = Rect::new(outer.x() + margin, outer.y() + margin, width, height)?;
            Ok(Candidate {
                location: inner.location(),
                clearance: Some(outer),
            })
        })
    }

    /// Stamps `mask`, turned randomly, onto a random free spot.
    ///
    /// # Errors
    ///
    /// [`PlaygroundError::EmptyLocation`] for a mask without set cells, a
    /// validation error if the mask fits the area in no orientation,
    /// otherwise as [`Self::create_object_random_dot`].
    pub fn create_object_random_by_dots_mask(
        &self,
        object: &Arc<T>,
        mask: &DotsMask,
    ) -> PlaygroundResult<Location> {
        if mask.dot_count() == 0 {
            return Err(PlaygroundError::EmptyLocation);
        }

        let area = self.area;
        let fits = |shape: &DotsMask| shape.width() <= area.width() && shape.height() <= area.height();
        if !fits(mask) && !fits(&mask.turn_right()) {
            return Err(GeometryError::RectDoesNotFit {
                width: mask.width(),
                height: mask.height(),
                area_width: area.width(),
                area_height: area.height(),
            }
            .into());
        }

        self.place(object, |rng| {
            let mut shape = mask.turn_random(rng);
            if !fits(&shape) {
                // The quarter turn swaps sides, and one of the two layouts fits
                shape = shape.turn_right();
            }
            let rect = area.new_random_rect(shape.width(), shape.height(), rng)?;
            Ok(Candidate::new(shape.location(rect.x(), rect.y())))
        })
    }

    // =========================================================================
    // UPDATE / DELETE
    // =========================================================================

    /// Moves `object` from `old` to `new`.
    ///
    /// Dots only in `new` are claimed all-or-nothing; dots only in `old` are
    /// released if `object` still owns them.
    ///
    /// # Errors
    ///
    /// - Validation error for an empty or out-of-area `new`
    /// - [`PlaygroundError::ObjectNotRegistered`]
    /// - [`PlaygroundError::LocationOccupied`]; `old` stays claimed
    pub fn update_object(
        &self,
        object: &Arc<T>,
        old: &Location,
        new: &Location,
    ) -> PlaygroundResult<()> {
        self.check_location(new)?;
        if !self.object_exists(object) {
            return Err(PlaygroundError::ObjectNotRegistered);
        }

        let added = new.difference(old);
        if !added.is_empty() && !self.claim(object, &added) {
            return Err(PlaygroundError::LocationOccupied);
        }

        self.release(object, &old.difference(new));
        Ok(())
    }

    /// Best-effort move: keeps the dots of `new` that were already in `old`
    /// plus whichever added dots were free.
    ///
    /// Returns the achieved location in `new` order.
    ///
    /// # Errors
    ///
    /// [`PlaygroundError::NoDotsAvailable`] if nothing of `new` could be
    /// held; `old` stays claimed. Otherwise as [`Self::update_object`].
    pub fn update_object_available_dots(
        &self,
        object: &Arc<T>,
        old: &Location,
        new: &Location,
    ) -> PlaygroundResult<Location> {
        self.check_location(new)?;
        if !self.object_exists(object) {
            return Err(PlaygroundError::ObjectNotRegistered);
        }

        let added = new.difference(old);
        let claimed: HashSet<u16> = self
            .occupancy
            .mset_if_absent(added.iter().map(|dot| (dot.hash(), Arc::clone(object))))
            .into_iter()
            .collect();
        let kept: HashSet<Dot> = old.iter().copied().collect();
        let achieved: Location = new
            .iter()
            .copied()
            .filter(|dot| kept.contains(dot) || claimed.contains(&dot.hash()))
            .collect();

        if achieved.is_empty() {
            return Err(PlaygroundError::NoDotsAvailable);
        }

        self.release(object, &old.difference(new));
        Ok(achieved)
    }

    /// Releases the dots of `location` still owned by `object` and drops it
    /// from the registry.
    ///
    /// # Errors
    ///
    /// [`PlaygroundError::ObjectNotRegistered`].
    pub fn delete_object(&self, object: &Arc<T>, location: &Location) -> PlaygroundResult<()> {
        if !self.object_exists(object) {
            return Err(PlaygroundError::ObjectNotRegistered);
        }

        self.release(object, location);
        self.unregister(object)
    }

    // =========================================================================
    // LOOKUPS
    // =========================================================================

    /// Returns true if every dot of a non-empty `location` is claimed.
    #[must_use]
    pub fn location_occupied(&self, location: &Location) -> bool {
        !location.is_empty() && self.occupancy.has_all(&location.hashes())
    }

    /// Returns true if `dot` is claimed.
    #[must_use]
    pub fn dot_occupied(&self, dot: Dot) -> bool {
        self.occupancy.has(dot.hash())
    }

    /// Object claiming `dot`.
    #[must_use]
    pub fn get_object_by_dot(&self, dot: Dot) -> Option<Arc<T>> {
        self.occupancy.get(dot.hash())
    }

    /// Distinct objects claiming any dot of `location`, in dot order.
    #[must_use]
    pub fn get_objects_by_dots(&self, location: &Location) -> Vec<Arc<T>> {
        let owners = self.occupancy.mget(&location.hashes());
        let mut objects: Vec<Arc<T>> = Vec::new();

        for dot in location {
            if let Some(owner) = owners.get(&dot.hash()) {
                if !objects.iter().any(|known| Arc::ptr_eq(known, owner)) {
                    objects.push(Arc::clone(owner));
                }
            }
        }

        objects
    }

    /// Snapshot of the registry.
    #[must_use]
    pub fn get_objects(&self) -> Vec<Arc<T>> {
        self.objects.lock().clone()
    }

    /// Returns true if `object` is registered.
    #[must_use]
    pub fn object_exists(&self, object: &Arc<T>) -> bool {
        self.objects.lock().iter().any(|known| Arc::ptr_eq(known, object))
    }

    /// Number of registered objects.
    #[must_use]
    pub fn objects_count(&self) -> usize {
        self.objects.lock().len()
    }

    /// Number of claimed dots.
    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.occupancy.count()
    }

    /// Every claimed dot, sorted by key.
    #[must_use]
    pub fn occupied_dots(&self) -> Vec<Dot> {
        let mut keys = self.occupancy.keys();
        keys.sort_unstable();
        keys.into_iter().map(Dot::from_hash).collect()
    }

    /// Steps across the area from `dot`, wrapping at the edges.
    ///
    /// # Errors
    ///
    /// Validation error if `dot` is outside the area.
    pub fn navigate(&self, dot: Dot, direction: Direction, distance: u8) -> PlaygroundResult<Dot> {
        Ok(self.area.navigate(dot, direction, distance)?)
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    fn check_location(&self, location: &Location) -> PlaygroundResult<()> {
        if location.is_empty() {
            return Err(PlaygroundError::EmptyLocation);
        }
        if !self.area.contains_location(location) {
            return Err(PlaygroundError::LocationOutOfArea { area: self.area });
        }
        Ok(())
    }

    fn claim(&self, object: &Arc<T>, location: &Location) -> bool {
        self.occupancy
            .mset_if_all_absent(location.iter().map(|dot| (dot.hash(), Arc::clone(object))))
    }

    fn release(&self, object: &Arc<T>, location: &Location) -> Vec<u16> {
        self.occupancy
            .mremove_if(&location.hashes(), |owner| Arc::ptr_eq(owner, object))
    }

    /// Adds `object` to the registry. `claimed` is released again if another
    /// caller registered the same object first.
    fn register(&self, object: &Arc<T>, claimed: &Location) -> PlaygroundResult<()> {
        let mut objects = self.objects.lock();
        if objects.iter().any(|known| Arc::ptr_eq(known, object)) {
            drop(objects);
            self.release(object, claimed);
            return Err(PlaygroundError::ObjectAlreadyRegistered);
        }
        objects.push(Arc::clone(object));
        Ok(())
    }

    fn unregister(&self, object: &Arc<T>) -> PlaygroundResult<()> {
        let mut objects = self.objects.lock();
        let index = objects
            .iter()
            .position(|known| Arc::ptr_eq(known, object))
            .ok_or(PlaygroundError::ObjectNotRegistered)?;
        objects.remove(index);
        Ok(())
    }

    fn place<F>(&self, object: &Arc<T>, mut sample: F) -> PlaygroundResult<Location>
    where
        F: FnMut(&mut ChaCha8Rng) -> PlaygroundResult<Candidate>,
    {
        if self.object_exists(object) {
            return Err(PlaygroundError::ObjectAlreadyRegistered);
        }

        for _ in 0..self.placement_retries {
            let candidate = {
                let mut rng = self.rng.lock();
                sample(&mut *rng)?
            };

            if let Some(clearance) = candidate.clearance {
                if self.occupancy.has_any(&clearance.location().hashes()) {
                    continue;
                }
            }

            if self.claim(object, &candidate.location) {
                self.register(object, &candidate.location)?;
                return Ok(candidate.location);
            }
        }

        tracing::debug!(
            attempts = self.placement_retries,
            area = %self.area,
            "random placement found no free location"
        );
        Err(PlaygroundError::RetriesExhausted {
            attempts: self.placement_retries,
        })
    }
}

/// `side + 2 * margin`, if it stays a valid side length.
fn with_border(side: u8, margin: u8) -> Option<u8> {
    side.checked_add(margin)?.checked_add(margin)
}

impl<T> std::fmt::Debug for Playground<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Playground")
            .field("area", &self.area)
            .field("objects", &self.objects_count())
            .field("occupied", &self.occupied_count())
            .finish_non_exhaustive()
    }
}
