//! Polymarket exchange configuration.

use serde::Deserialize;

/// Polymarket HTTP client configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PolymarketHttpConfig {
    /// Request timeout in milliseconds.
    #[serde(default = "default_http_timeout_ms")]
    pub timeout_ms: u64,
    /// Connect timeout in milliseconds.
    #[serde(default = "default_http_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

const fn default_http_timeout_ms() -> u64 {
    10_000
}

const fn default_http_connect_timeout_ms() -> u64 {
    3_000
}

impl Default for PolymarketHttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_http_timeout_ms(),
            connect_timeout_ms: default_http_connect_timeout_ms(),
        }
    }
}

/// Polymarket exchange configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PolymarketConfig {
    /// WebSocket URL for the public market channel.
    #[serde(default = "default_polymarket_ws_url")]
    pub ws_url: String,
    /// CLOB REST API URL (market listing).
    #[serde(default = "default_polymarket_api_url")]
    pub api_url: String,
    /// Gamma REST API URL (24h volume); empty disables the volume join.
    #[serde(default = "default_polymarket_gamma_url")]
    pub gamma_api_url: String,
    /// HTTP client configuration for REST API calls.
    #[serde(default)]
    pub http: PolymarketHttpConfig,
    /// Upper bound on listing pages fetched in one discovery scan.
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,
}

fn default_polymarket_ws_url() -> String {
    "wss://ws-subscriptions-clob.polymarket.com/ws/market".into()
}

fn default_polymarket_api_url() -> String {
    "https://clob.polymarket.com".into()
}

fn default_polymarket_gamma_url() -> String {
    "https://gamma-api.polymarket.com".into()
}

const fn default_max_pages() -> usize {
    1000
}

impl Default for PolymarketConfig {
    fn default() -> Self {
        Self {
            ws_url: default_polymarket_ws_url(),
            api_url: default_polymarket_api_url(),
            gamma_api_url: default_polymarket_gamma_url(),
            http: PolymarketHttpConfig::default(),
            max_pages: default_max_pages(),
        }
    }
}
