//! # ARENA Shared
//!
//! Geometry value types used by the spatial store and by whatever transport
//! layer frames them for clients.
//!
//! ## Coordinate System
//!
//! ```text
//!   (0,0) ──── x grows East ────▶ (width-1, 0)
//!     │
//!     y grows South
//!     │
//!     ▼
//!   (0, height-1)
//! ```
//!
//! The world is a torus: navigating past an edge continues from the
//! opposite edge.
//!
//! ## CRITICAL RULE
//!
//! Everything here is a plain value. Nothing locks, nothing blocks.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod geometry;

pub use arena_core::ErrorKind;
pub use error::{GeometryError, GeometryResult};
pub use geometry::{Area, Direction, Dot, DotsMask, Location, Rect};
