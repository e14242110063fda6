//! # ARENA Core
//!
//! Concurrency primitives the arena server is built on:
//! - A 16-bit keyed map split into independently locked shards
//! - Stop signals that abort every bounded wait in the system
//!
//! ## Architecture Rules
//!
//! 1. **Independent keys never contend** - one lock per shard, never a global lock
//! 2. **Every shard is touched at most once per batch call**
//! 3. **Every wait is cancellable** - waits select on a stop signal and a timer
//!
//! ## Example
//!
//! ```rust
//! use arena_core::ShardedMap;
//!
//! let map: ShardedMap<&str> = ShardedMap::new(4).unwrap();
//! map.set(5, "a");
//! map.set(5, "b");
//! assert_eq!(map.get(5), Some("b"));
//! assert_eq!(map.count(), 1);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod error;
pub mod sync;

pub use error::{ErrorKind, ShardedMapError, ShardedMapResult};
pub use sync::{ShardKey, ShardedMap, StopHandle, StopSignal, DEFAULT_SHARD_COUNT};
