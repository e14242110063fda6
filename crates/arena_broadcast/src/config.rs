//! Broadcaster queue sizes and timeouts.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{BroadcastError, BroadcastResult};

/// Configuration for a [`Broadcaster`](crate::Broadcaster).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BroadcastConfig {
    /// Capacity of the shared ingress queue.
    pub ingress_capacity: usize,
    /// Capacity of each subscriber's relay queue.
    pub relay_capacity: usize,
    /// Longest a publish or a delivery may wait (ms).
    pub send_timeout_ms: u64,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            ingress_capacity: 64,
            relay_capacity: 128,
            send_timeout_ms: 100,
        }
    }
}

impl BroadcastConfig {
    /// Low-latency config for tick-driven servers.
    ///
    /// Larger queues absorb a burst of one full tick of mutations, and a
    /// short timeout keeps a stalled subscriber's relay from lingering on one
    /// event for more than about a frame at 60Hz.
    #[must_use]
    pub const fn low_latency() -> Self {
        Self {
            ingress_capacity: 256,
            relay_capacity: 256,
            send_timeout_ms: 15,
        }
    }

    /// Send timeout as a duration.
    #[inline]
    #[must_use]
    pub const fn send_timeout(&self) -> Duration {
        Duration::from_millis(self.send_timeout_ms)
    }

    /// Checks every value.
    ///
    /// # Errors
    ///
    /// Returns [`BroadcastError::InvalidConfig`] for a zero capacity or a
    /// zero timeout.
    pub fn validate(&self) -> BroadcastResult<()> {
        if self.ingress_capacity == 0 {
            return Err(BroadcastError::InvalidConfig(
                "ingress_capacity must be at least 1".to_string(),
            ));
        }
        if self.relay_capacity == 0 {
            return Err(BroadcastError::InvalidConfig(
                "relay_capacity must be at least 1".to_string(),
            ));
        }
        if self.send_timeout_ms == 0 {
            return Err(BroadcastError::InvalidConfig(
                "send_timeout_ms must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BroadcastConfig::default();
        assert_eq!(config.ingress_capacity, 64);
        assert_eq!(config.relay_capacity, 128);
        assert_eq!(config.send_timeout(), Duration::from_millis(100));
        assert!(config.validate().is_ok());
        assert!(BroadcastConfig::low_latency().validate().is_ok());
    }

    #[test]
    fn test_validate() {
        let config = BroadcastConfig {
            relay_capacity: 0,
            ..BroadcastConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(err.kind(), arena_core::ErrorKind::Configuration);

        let config = BroadcastConfig {
            send_timeout_ms: 0,
            ..BroadcastConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml() {
        let config: BroadcastConfig = toml::from_str("send_timeout_ms = 250").unwrap();
        assert_eq!(config.send_timeout(), Duration::from_millis(250));
        assert_eq!(config.ingress_capacity, 64);
    }
}
