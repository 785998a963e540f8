//! Hub configuration (queues, heartbeat)

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Connection hub configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HubConfig {
    /// Capacity of each connection's bounded outbound queue. A full queue
    /// marks the connection as a slow consumer and evicts it.
    #[serde(default = "default_outbound_queue_capacity")]
    pub outbound_queue_capacity: usize,

    /// Seconds between protocol pings sent by the write pump.
    #[serde(default = "default_ping_interval_secs")]
    pub ping_interval_secs: u64,

    /// Seconds of inbound silence before a connection is considered dead
    /// and evicted. Must exceed the ping interval so a healthy client has
    /// at least one chance to answer.
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,
}

impl HubConfig {
    /// Get the ping interval as a Duration
    pub fn ping_interval(&self) -> Duration {
        Duration::from_secs(self.ping_interval_secs)
    }

    /// Get the idle timeout as a Duration
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    /// Validate hub configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.outbound_queue_capacity == 0 {
            return Err(ValidationError::InvalidQueueCapacity);
        }
        if self.idle_timeout_secs <= self.ping_interval_secs {
            return Err(ValidationError::InvalidHeartbeat);
        }
        Ok(())
    }
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            outbound_queue_capacity: default_outbound_queue_capacity(),
            ping_interval_secs: default_ping_interval_secs(),
            idle_timeout_secs: default_idle_timeout_secs(),
        }
    }
}

fn default_outbound_queue_capacity() -> usize {
    256
}

fn default_ping_interval_secs() -> u64 {
    45
}

fn default_idle_timeout_secs() -> u64 {
    60
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hub_config_defaults() {
        let config = HubConfig::default();
        assert_eq!(config.outbound_queue_capacity, 256);
        assert_eq!(config.ping_interval(), Duration::from_secs(45));
        assert_eq!(config.idle_timeout(), Duration::from_secs(60));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let config = HubConfig {
            outbound_queue_capacity: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_idle_timeout_must_exceed_ping_interval() {
        let config = HubConfig {
            ping_interval_secs: 60,
            idle_timeout_secs: 60,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
