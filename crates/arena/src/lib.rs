//! # ARENA
//!
//! The concurrency-and-state core of a multiplayer arena server.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                 WORLD                                   │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────────┐                           ┌─────────────────┐      │
//! │  │   Playground    │      store outcome        │   Broadcaster   │      │
//! │  │                 │ ────────────────────────> │                 │      │
//! │  │  • Occupancy    │          Event            │  • Ingress      │      │
//! │  │  • Registry     │                           │  • Relays       │      │
//! │  │  • Placement    │                           │  • Drop-oldest  │      │
//! │  └────────┬────────┘                           └─────────────────┘      │
//! │           │                                                             │
//! │  ┌────────┴────────┐     ┌─────────────────┐                            │
//! │  │   ShardedMap    │     │    Geometry     │                            │
//! │  │  (arena_core)   │     │ (arena_shared)  │                            │
//! │  └─────────────────┘     └─────────────────┘                            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The store never depends on the broadcaster; the world reports every store
//! outcome after the fact.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use arena::{EventKind, World, WorldConfig};
//! use arena::core::StopHandle;
//! use arena::shared::{Dot, Location};
//!
//! let world = World::new(&WorldConfig::default())?;
//! let (handle, stop) = StopHandle::new();
//! world.start(&stop);
//! let events = world.events(&stop, 16);
//!
//! let apple = Arc::new("apple");
//! world.create_object(&apple, &Location::from(Dot::new(3, 4)))?;
//!
//! let event = events.recv_timeout(Duration::from_secs(1))?;
//! assert_eq!(event.kind(), EventKind::Created);
//! handle.stop();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod event;
pub mod world;

// Re-export the layers
pub use arena_broadcast as broadcast;
pub use arena_core as core;
pub use arena_playground as playground;
pub use arena_shared as shared;

// Re-export commonly used types
pub use config::WorldConfig;
pub use error::{ConfigError, WorldError, WorldResult};
pub use event::{Event, EventKind, Payload};
pub use world::{World, WorldStats};
