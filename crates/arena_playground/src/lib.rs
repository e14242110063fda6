//! # ARENA Playground
//!
//! The spatial object store: which object claims which dot of the area.
//!
//! ## Claiming Dots
//!
//! ```text
//!   create_object(o, L)
//!       │
//!       ├─ validate L against the area
//!       ├─ mset_if_all_absent(L → o)   all dots or none
//!       └─ register o                  occupancy first, registry second
//! ```
//!
//! Moves claim the added dots all-or-nothing and release the removed dots
//! only where the mover still owns them, so an object can never free a dot
//! another object holds.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use arena_playground::{Playground, PlaygroundConfig};
//! use arena_shared::{Area, Dot, Location};
//!
//! let playground = Playground::new(Area::new(10, 10)?, &PlaygroundConfig::default())?;
//! let snake = Arc::new("snake");
//! let body: Location = vec![Dot::new(0, 0), Dot::new(0, 1)].into();
//!
//! playground.create_object(&snake, &body)?;
//! assert!(playground.location_occupied(&body));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod playground;

pub use config::PlaygroundConfig;
pub use error::{PlaygroundError, PlaygroundResult};
pub use playground::Playground;
