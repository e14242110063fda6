//! The spatial store with every call reported as an event.

use std::sync::Arc;

use arena_broadcast::{BroadcastState, Broadcaster, Subscription};
use arena_core::StopSignal;
use arena_playground::{Playground, PlaygroundResult};
use arena_shared::{Area, Direction, Dot, DotsMask, Location};

use crate::config::WorldConfig;
use crate::error::{WorldError, WorldResult};
use crate::event::{Event, EventKind};

/// Point-in-time counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WorldStats {
    /// Registered objects.
    pub objects: usize,
    /// Claimed dots.
    pub occupied_dots: usize,
    /// Live event subscribers.
    pub subscribers: usize,
}

/// Spatial store plus event stream.
///
/// Successful mutations publish `Created`, `Updated` or `Deleted`; failed
/// store calls publish an `Error` event and return the same error.
/// Publishing never fails a store call. Before [`World::start`] events are
/// queued without waiting and delivered once started; whatever does not fit
/// the ingress queue by then is dropped. After [`World::close`] nothing is
/// published.
pub struct World<T> {
    playground: Playground<T>,
    broadcaster: Broadcaster<Event<T>>,
}

impl<T: Send + Sync + 'static> World<T> {
    /// Builds a world from `config`.
    ///
    /// # Errors
    ///
    /// Configuration error if any value is out of range.
    pub fn new(config: &WorldConfig) -> WorldResult<Self> {
        config.validate()?;

        Ok(Self {
            playground: Playground::new(config.area()?, &config.playground)?,
            broadcaster: Broadcaster::new(config.broadcast.clone())?,
        })
    }

    /// Starts event delivery until `stop` fires. Only the first call has an
    /// effect.
    pub fn start(&self, stop: &StopSignal) {
        self.broadcaster.start(stop);
    }

    /// Stops event delivery and disconnects every subscriber.
    pub fn close(&self) {
        self.broadcaster.close();
    }

    /// Subscribes to events. The receiver keeps the newest `buffer` events
    /// if the caller falls behind; dropping it unsubscribes.
    pub fn events(&self, stop: &StopSignal, buffer: usize) -> Subscription<Event<T>> {
        self.broadcaster.subscribe(stop, buffer)
    }

    /// See [`Playground::create_object`].
    ///
    /// # Errors
    ///
    /// The store error, also published as an `Error` event.
    pub fn create_object(&self, object: &Arc<T>, location: &Location) -> WorldResult<()> {
        let result = self.playground.create_object(object, location);
        self.report(EventKind::Created, object, result)
    }

    /// See [`Playground::create_object_available_dots`].
    ///
    /// # Errors
    ///
    /// The store error, also published as an `Error` event.
    pub fn create_object_available_dots(
        &self,
        object: &Arc<T>,
        location: &Location,
    ) -> WorldResult<Location> {
        let result = self.playground.create_object_available_dots(object, location);
        self.report(EventKind::Created, object, result)
    }

    /// See [`Playground::create_object_random_dot`].
    ///
    /// # Errors
    ///
    /// The store error, also published as an `Error` event.
    pub fn create_object_random_dot(&self, object: &Arc<T>) -> WorldResult<Location> {
        let result = self.playground.create_object_random_dot(object);
        self.report(EventKind::Created, object, result)
    }

    /// See [`Playground::create_object_random_rect`].
    ///
    /// # Errors
    ///
    /// The store error, also published as an `Error` event.
    pub fn create_object_random_rect(
        &self,
        object: &Arc<T>,
        width: u8,
        height: u8,
    ) -> WorldResult<Location> {
        let result = self.playground.create_object_random_rect(object, width, height);
        self.report(EventKind::Created, object, result)
    }

    /// See [`Playground::create_object_random_rect_margin`].
    ///
    /// # Errors
    ///
    /// The store error, also published as an `Error` event.
    pub fn create_object_random_rect_margin(
        &self,
        object: &Arc<T>,
        width: u8,
        height: u8,
        margin: u8,
    ) -> WorldResult<Location> {
        let result = self
            .playground
            .create_object_random_rect_margin(object, width, height, margin);
        self.report(EventKind::Created, object, result)
    }

    /// See [`Playground::create_object_random_by_dots_mask`].
    ///
    /// # Errors
    ///
    /// The store error, also published as an `Error` event.
    pub fn create_object_random_by_dots_mask(
        &self,
        object: &Arc<T>,
        mask: &DotsMask,
    ) -> WorldResult<Location> {
        let result = self.playground.create_object_random_by_dots_mask(object, mask);
        self.report(EventKind::Created, object, result)
    }

    /// See [`Playground::update_object`].
    ///
    /// # Errors
    ///
    /// The store error, also published as an `Error` event.
    pub fn update_object(&self, object: &Arc<T>, old: &Location, new: &Location) -> WorldResult<()> {
        let result = self.playground.update_object(object, old, new);
        self.report(EventKind::Updated, object, result)
    }

    /// See [`Playground::update_object_available_dots`].
    ///
    /// # Errors
    ///
    /// The store error, also published as an `Error` event.
    pub fn update_object_available_dots(
        &self,
        object: &Arc<T>,
        old: &Location,
        new: &Location,
    ) -> WorldResult<Location> {
        let result = self.playground.update_object_available_dots(object, old, new);
        self.report(EventKind::Updated, object, result)
    }

    /// See [`Playground::delete_object`].
    ///
    /// # Errors
    ///
    /// The store error, also published as an `Error` event.
    pub fn delete_object(&self, object: &Arc<T>, location: &Location) -> WorldResult<()> {
        let result = self.playground.delete_object(object, location);
        self.report(EventKind::Deleted, object, result)
    }

    /// Returns true if every dot of `location` is claimed. Publishes nothing.
    #[must_use]
    pub fn location_occupied(&self, location: &Location) -> bool {
        self.playground.location_occupied(location)
    }

    /// Object claiming `dot`; publishes `Checked` when one is found.
    #[must_use]
    pub fn get_object_by_dot(&self, dot: Dot) -> Option<Arc<T>> {
        let object = self.playground.get_object_by_dot(dot)?;
        self.publish(Event::object(EventKind::Checked, &object));
        Some(object)
    }

    /// Distinct objects on `location`; publishes `Checked` for each.
    #[must_use]
    pub fn get_objects_by_dots(&self, location: &Location) -> Vec<Arc<T>> {
        let objects = self.playground.get_objects_by_dots(location);
        for object in &objects {
            self.publish(Event::object(EventKind::Checked, object));
        }
        objects
    }

    /// Snapshot of every registered object.
    #[must_use]
    pub fn get_objects(&self) -> Vec<Arc<T>> {
        self.playground.get_objects()
    }

    /// Returns true if `object` is registered.
    #[must_use]
    pub fn object_exists(&self, object: &Arc<T>) -> bool {
        self.playground.object_exists(object)
    }

    /// Steps across the area from `dot`, wrapping at the edges.
    ///
    /// # Errors
    ///
    /// Validation error if `dot` is outside the area.
    pub fn navigate(&self, dot: Dot, direction: Direction, distance: u8) -> WorldResult<Dot> {
        Ok(self.playground.navigate(dot, direction, distance)?)
    }

    /// The playing field.
    #[must_use]
    pub fn area(&self) -> Area {
        self.playground.area()
    }

    /// Current counters.
    #[must_use]
    pub fn stats(&self) -> WorldStats {
        WorldStats {
            objects: self.playground.objects_count(),
            occupied_dots: self.playground.occupied_count(),
            subscribers: self.broadcaster.subscriber_count(),
        }
    }

    /// Publishes the outcome of a store call and hands it back.
    fn report<R>(&self, kind: EventKind, object: &Arc<T>, result: PlaygroundResult<R>) -> WorldResult<R> {
        match result {
            Ok(value) => {
                self.publish(Event::object(kind, object));
                Ok(value)
            }
            Err(err) => {
                let err = WorldError::from(err);
                self.publish(Event::error(err.clone()));
                Err(err)
            }
        }
    }

    fn publish(&self, event: Event<T>) {
        let published = match self.broadcaster.state() {
            BroadcastState::Created => self.broadcaster.try_publish(event),
            BroadcastState::Running => self.broadcaster.publish(event),
            BroadcastState::Stopped => return,
        };
        if let Err(err) = published {
            tracing::trace!(%err, "event not published");
        }
    }
}

impl<T> std::fmt::Debug for World<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("playground", &self.playground)
            .field("broadcaster", &self.broadcaster)
            .finish()
    }
}
