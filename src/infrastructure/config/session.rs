//! Streaming session and reconnection configuration.

use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// Most instruments the market channel accepts in one subscription frame.
pub const MAX_BATCH_SIZE: usize = 500;

/// WebSocket reconnection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ReconnectionConfig {
    /// Delay before the first reconnection attempt (milliseconds).
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    /// Ceiling for the reconnection delay (milliseconds).
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    /// Multiplier applied to the delay after each failed attempt.
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
    /// Upper bound of random jitter as a fraction of the delay.
    #[serde(default = "default_jitter")]
    pub jitter: f64,
}

const fn default_initial_delay_ms() -> u64 {
    1_000
}

const fn default_max_delay_ms() -> u64 {
    60_000
}

const fn default_backoff_multiplier() -> f64 {
    2.0
}

const fn default_jitter() -> f64 {
    0.2
}

impl Default for ReconnectionConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
            jitter: default_jitter(),
        }
    }
}

impl ReconnectionConfig {
    /// Reject schedules that could retry without waiting.
    pub fn check(&self) -> Result<(), ConfigError> {
        let invalid = |field, reason: &str| ConfigError::InvalidValue {
            field,
            reason: reason.to_owned(),
        };
        if self.initial_delay_ms == 0 {
            return Err(invalid("initial_delay_ms", "must be greater than 0"));
        }
        if self.max_delay_ms < self.initial_delay_ms {
            return Err(invalid("max_delay_ms", "must be >= initial_delay_ms"));
        }
        if !(self.backoff_multiplier.is_finite() && self.backoff_multiplier >= 1.0) {
            return Err(invalid("backoff_multiplier", "must be a finite number >= 1.0"));
        }
        if !(0.0..=1.0).contains(&self.jitter) {
            return Err(invalid("jitter", "must be between 0 and 1"));
        }
        Ok(())
    }
}

/// Connection, subscription and heartbeat settings for the market feed.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Asset ids per subscription frame (1..=500).
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Pause between subscription frames (milliseconds).
    #[serde(default = "default_batch_delay_ms")]
    pub batch_delay_ms: u64,
    /// Application-level ping interval (seconds).
    #[serde(default = "default_heartbeat_interval_secs")]
    pub heartbeat_interval_secs: u64,
    /// Time allowed for the pong reply (seconds). Must be below the interval.
    #[serde(default = "default_heartbeat_timeout_secs")]
    pub heartbeat_timeout_secs: u64,
    /// Streaming time after which the backoff resets (seconds).
    #[serde(default = "default_stability_window_secs")]
    pub stability_window_secs: u64,
    #[serde(default)]
    pub reconnection: ReconnectionConfig,
}

const fn default_batch_size() -> usize {
    MAX_BATCH_SIZE
}

const fn default_batch_delay_ms() -> u64 {
    100
}

const fn default_heartbeat_interval_secs() -> u64 {
    30
}

const fn default_heartbeat_timeout_secs() -> u64 {
    10
}

const fn default_stability_window_secs() -> u64 {
    10
}

impl SessionConfig {
    #[must_use]
    pub const fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_secs)
    }

    #[must_use]
    pub const fn heartbeat_timeout(&self) -> Duration {
        Duration::from_secs(self.heartbeat_timeout_secs)
    }

    #[must_use]
    pub const fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }

    #[must_use]
    pub const fn stability_window(&self) -> Duration {
        Duration::from_secs(self.stability_window_secs)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            batch_delay_ms: default_batch_delay_ms(),
            heartbeat_interval_secs: default_heartbeat_interval_secs(),
            heartbeat_timeout_secs: default_heartbeat_timeout_secs(),
            stability_window_secs: default_stability_window_secs(),
            reconnection: ReconnectionConfig::default(),
        }
    }
}
