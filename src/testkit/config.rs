//! Canonical test configurations.
//!
//! Single source of truth for config structs used across tests.

use crate::infrastructure::config::session::{ReconnectionConfig, SessionConfig};

/// Reconnection config with zero delays and no jitter.
pub fn reconnection() -> ReconnectionConfig {
    ReconnectionConfig {
        initial_delay_ms: 0,
        max_delay_ms: 0,
        backoff_multiplier: 1.0,
        jitter: 0.0,
    }
}

/// Session config that never waits between batches or reconnects.
pub fn session() -> SessionConfig {
    SessionConfig {
        batch_size: 500,
        batch_delay_ms: 0,
        heartbeat_interval_secs: 30,
        heartbeat_timeout_secs: 10,
        stability_window_secs: 10,
        reconnection: reconnection(),
    }
}
