//! # ARENA Broadcast
//!
//! Fans one stream of events out to many independent observers without
//! letting a slow observer block the producer or its peers.
//!
//! ## Delivery Guarantees
//!
//! 1. **Per-subscriber order** - events arrive in publish order or not at all
//! 2. **Bounded memory** - every queue is bounded; a full output drops its oldest event
//! 3. **Bounded waits** - publish and delivery give up after the send timeout
//! 4. **No waiting on subscribers** - the dispatcher drops an event for a subscriber whose queue is full
//!
//! ## Example
//!
//! ```rust
//! use std::time::Duration;
//! use arena_broadcast::{BroadcastConfig, Broadcaster};
//! use arena_core::StopHandle;
//!
//! let broadcaster = Broadcaster::new(BroadcastConfig::default())?;
//! let (handle, stop) = StopHandle::new();
//! broadcaster.start(&stop);
//!
//! let events = broadcaster.subscribe(&stop, 16);
//! broadcaster.publish("created")?;
//! assert_eq!(events.recv_timeout(Duration::from_secs(1)), Ok("created"));
//!
//! handle.stop();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod broadcaster;
pub mod config;
pub mod error;
pub mod subscription;

pub use broadcaster::{BroadcastState, Broadcaster};
pub use config::BroadcastConfig;
pub use error::{BroadcastError, BroadcastResult};
pub use subscription::Subscription;
