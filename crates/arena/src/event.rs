//! # World Events
//!
//! One event per store call, fanned out to every subscriber.
//!
//! ```text
//! ┌─────────────┐      ┌─────────────┐      ┌─────────────┐
//! │   Caller    │─────>│    World    │─────>│ Broadcaster │──> subscribers
//! │  (mutates)  │      │  (reports)  │      │  (fan-out)  │
//! └─────────────┘      └─────────────┘      └─────────────┘
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::WorldError;

/// What happened.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// Object placed.
    Created,
    /// Object moved.
    Updated,
    /// Object removed.
    Deleted,
    /// Object looked up by a caller.
    Checked,
    /// A store call failed.
    Error,
}

/// What it happened to.
#[derive(Debug)]
pub enum Payload<T> {
    /// The object involved.
    Object(Arc<T>),
    /// The failure.
    Error(WorldError),
}

impl<T> Clone for Payload<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Object(object) => Self::Object(Arc::clone(object)),
            Self::Error(err) => Self::Error(err.clone()),
        }
    }
}

/// Immutable record of one store call.
#[derive(Debug)]
pub struct Event<T> {
    kind: EventKind,
    payload: Payload<T>,
}

impl<T> Event<T> {
    /// Event about `object`.
    #[must_use]
    pub fn object(kind: EventKind, object: &Arc<T>) -> Self {
        Self {
            kind,
            payload: Payload::Object(Arc::clone(object)),
        }
    }

    /// Failure event.
    #[must_use]
    pub fn error(err: WorldError) -> Self {
        Self {
            kind: EventKind::Error,
            payload: Payload::Error(err),
        }
    }

    /// Kind of the event.
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        self.kind
    }

    /// Payload of the event.
    #[must_use]
    pub const fn payload(&self) -> &Payload<T> {
        &self.payload
    }

    /// Object involved, unless this is an error event.
    #[must_use]
    pub fn as_object(&self) -> Option<&Arc<T>> {
        match &self.payload {
            Payload::Object(object) => Some(object),
            Payload::Error(_) => None,
        }
    }

    /// Failure carried by an error event.
    #[must_use]
    pub fn as_error(&self) -> Option<&WorldError> {
        match &self.payload {
            Payload::Error(err) => Some(err),
            Payload::Object(_) => None,
        }
    }
}

impl<T> Clone for Event<T> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            payload: self.payload.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_playground::PlaygroundError;

    struct NotClone;

    #[test]
    fn test_clone_shares_object() {
        let object = Arc::new(NotClone);
        let event = Event::object(EventKind::Created, &object);
        let copy = event.clone();

        assert_eq!(copy.kind(), EventKind::Created);
        assert!(Arc::ptr_eq(copy.as_object().unwrap(), &object));
        assert!(copy.as_error().is_none());
    }

    #[test]
    fn test_error_event() {
        let event: Event<NotClone> = Event::error(PlaygroundError::LocationOccupied.into());
        assert_eq!(event.kind(), EventKind::Error);
        assert_eq!(
            event.as_error().map(WorldError::kind),
            Some(arena_core::ErrorKind::Conflict)
        );
        assert!(event.as_object().is_none());
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(serde_json::to_string(&EventKind::Checked).unwrap(), r#""checked""#);
        let kind: EventKind = serde_json::from_str(r#""deleted""#).unwrap();
        assert_eq!(kind, EventKind::Deleted);
    }
}
