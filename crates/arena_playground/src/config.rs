//! Playground tuning knobs.

use serde::{Deserialize, Serialize};

use crate::error::{PlaygroundError, PlaygroundResult};

/// Configuration for a [`Playground`](crate::Playground).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaygroundConfig {
    /// Number of occupancy shards.
    pub shard_count: usize,
    /// Placements tried by the random create variants before giving up.
    pub placement_retries: u32,
    /// Seed of the placement rng.
    pub seed: u64,
}

impl Default for PlaygroundConfig {
    fn default() -> Self {
        Self {
            shard_count: arena_core::DEFAULT_SHARD_COUNT,
            placement_retries: 64,
            seed: 0x00A2_E4A0,
        }
    }
}

impl PlaygroundConfig {
    /// Checks every value.
    ///
    /// # Errors
    ///
    /// Returns [`PlaygroundError::InvalidConfig`] for a zero shard count or a
    /// zero retry budget.
    pub fn validate(&self) -> PlaygroundResult<()> {
        if self.shard_count == 0 {
            return Err(PlaygroundError::InvalidConfig(
                "shard_count must be at least 1".to_string(),
            ));
        }
        if self.placement_retries == 0 {
            return Err(PlaygroundError::InvalidConfig(
                "placement_retries must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the config with `seed` replaced.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}
