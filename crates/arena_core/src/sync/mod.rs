//! # Synchronization Primitives for the Arena
//!
//! ## The Problem
//!
//! ```text
//! Thread 1 (snake A):  claim dots (3,4) (3,5)
//! Thread 2 (snake B):  claim dots (90,12)
//! Thread 3 (observer): count occupied dots
//!
//! One global lock:   every move serializes behind every other move
//! No lock:           two snakes claim the same dot
//! ```
//!
//! ## The Solution: Sharding
//!
//! ```text
//!   key = dot.hash()          shard = key % shard_count
//!
//!   ┌─────────┐ ┌─────────┐ ┌─────────┐       ┌─────────┐
//!   │ Shard 0 │ │ Shard 1 │ │ Shard 2 │  ...  │ Shard N │
//!   │ RwLock  │ │ RwLock  │ │ RwLock  │       │ RwLock  │
//!   └─────────┘ └─────────┘ └─────────┘       └─────────┘
//! ```
//!
//! Moves touching different shards run fully in parallel. Batch calls lock
//! one shard at a time, so they are not atomic across shards; see
//! [`ShardedMap::mset_if_all_absent`].

mod sharded_map;
mod stop;

pub use sharded_map::{ShardKey, ShardedMap, DEFAULT_SHARD_COUNT};
pub use stop::{StopHandle, StopSignal};
