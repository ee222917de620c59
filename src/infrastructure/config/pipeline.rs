//! Discovery, dispatch, inference and journal settings.

use std::path::PathBuf;
use std::time::Duration;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

use crate::domain::market::MIN_VOLUME_THRESHOLD;

/// Market discovery and snapshot cache.
#[derive(Debug, Clone, Deserialize)]
pub struct DiscoveryConfig {
    /// Minimum 24h volume for a market to be tracked.
    #[serde(default = "default_min_volume_24h")]
    pub min_volume_24h: Decimal,
    #[serde(default = "default_cache_path")]
    pub cache_path: PathBuf,
    /// Snapshot age after which discovery rescans (seconds).
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

const fn default_min_volume_24h() -> Decimal {
    MIN_VOLUME_THRESHOLD
}

fn default_cache_path() -> PathBuf {
    PathBuf::from("discovery_cache.json")
}

const fn default_cache_ttl_secs() -> u64 {
    3600
}

impl DiscoveryConfig {
    #[must_use]
    pub const fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            min_volume_24h: default_min_volume_24h(),
            cache_path: default_cache_path(),
            cache_ttl_secs: default_cache_ttl_secs(),
        }
    }
}

/// Receive-path dispatch.
#[derive(Debug, Clone, Deserialize)]
pub struct DispatchConfig {
    /// Minimum spacing of inference passes per market (milliseconds).
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "default_inference_queue_capacity")]
    pub inference_queue_capacity: usize,
}

const fn default_debounce_ms() -> u64 {
    500
}

const fn default_inference_queue_capacity() -> usize {
    1024
}

impl DispatchConfig {
    #[must_use]
    pub const fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            inference_queue_capacity: default_inference_queue_capacity(),
        }
    }
}

/// Arbitrage evaluation.
#[derive(Debug, Clone, Deserialize)]
pub struct InferenceConfig {
    /// Shares bought on each side.
    #[serde(default = "default_target_size")]
    pub target_size: Decimal,
    /// Exchange fee as a fraction of notional.
    #[serde(default)]
    pub fee_rate: Decimal,
    /// Skip pairs with a side older than this (milliseconds). 0 disables.
    #[serde(default)]
    pub max_book_age_ms: u64,
}

const fn default_target_size() -> Decimal {
    dec!(500)
}

impl InferenceConfig {
    #[must_use]
    pub const fn max_book_age(&self) -> Option<Duration> {
        match self.max_book_age_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            target_size: default_target_size(),
            fee_rate: Decimal::ZERO,
            max_book_age_ms: 0,
        }
    }
}

/// Append-only analytics logs.
#[derive(Debug, Clone, Deserialize)]
pub struct JournalConfig {
    #[serde(default = "default_opportunity_path")]
    pub opportunity_path: PathBuf,
    #[serde(default = "default_event_path")]
    pub event_path: PathBuf,
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

fn default_opportunity_path() -> PathBuf {
    PathBuf::from("logs/opportunities.jsonl")
}

fn default_event_path() -> PathBuf {
    PathBuf::from("logs/events.jsonl")
}

const fn default_queue_capacity() -> usize {
    10_000
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            opportunity_path: default_opportunity_path(),
            event_path: default_event_path(),
            queue_capacity: default_queue_capacity(),
        }
    }
}
