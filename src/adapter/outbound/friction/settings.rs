//! Friction feed configuration.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

/// Gas and conversion-rate feed configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FrictionConfig {
    /// Gas station endpoint returning fee tiers in gwei.
    #[serde(default = "default_gas_station_url")]
    pub gas_station_url: String,
    /// Simple-price endpoint for the native token.
    #[serde(default = "default_price_url")]
    pub price_url: String,
    /// Coin identifier passed to the price endpoint.
    #[serde(default = "default_price_coin_id")]
    pub price_coin_id: String,
    /// Environment variable holding the price API key.
    #[serde(default = "default_price_api_key_env")]
    pub price_api_key_env: String,
    /// Header the API key is sent in.
    #[serde(default = "default_price_api_key_header")]
    pub price_api_key_header: String,
    /// Seconds between refreshes.
    #[serde(default = "default_refresh_secs")]
    pub refresh_secs: u64,
    /// Request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Gas units assumed for one order placement.
    #[serde(default = "default_gas_units_per_order")]
    pub gas_units_per_order: u64,
    /// Order placements per arbitrage (one per outcome).
    #[serde(default = "default_orders_per_trade")]
    pub orders_per_trade: u32,
    /// Gas price used until the first successful fetch.
    #[serde(default = "default_fallback_gas_price_gwei")]
    pub fallback_gas_price_gwei: Decimal,
    /// Native token price used until the first successful fetch.
    #[serde(default = "default_fallback_native_usd")]
    pub fallback_native_usd: Decimal,
}

fn default_gas_station_url() -> String {
    "https://gasstation.polygon.technology/v2".into()
}

fn default_price_url() -> String {
    "https://api.coingecko.com/api/v3/simple/price".into()
}

fn default_price_coin_id() -> String {
    "polygon-ecosystem-token".into()
}

fn default_price_api_key_env() -> String {
    "PRICE_API_KEY".into()
}

fn default_price_api_key_header() -> String {
    "x-cg-demo-api-key".into()
}

const fn default_refresh_secs() -> u64 {
    60
}

const fn default_timeout_ms() -> u64 {
    5_000
}

const fn default_gas_units_per_order() -> u64 {
    150_000
}

const fn default_orders_per_trade() -> u32 {
    2
}

fn default_fallback_gas_price_gwei() -> Decimal {
    dec!(50)
}

fn default_fallback_native_usd() -> Decimal {
    dec!(0.50)
}

impl Default for FrictionConfig {
    fn default() -> Self {
        Self {
            gas_station_url: default_gas_station_url(),
            price_url: default_price_url(),
            price_coin_id: default_price_coin_id(),
            price_api_key_env: default_price_api_key_env(),
            price_api_key_header: default_price_api_key_header(),
            refresh_secs: default_refresh_secs(),
            timeout_ms: default_timeout_ms(),
            gas_units_per_order: default_gas_units_per_order(),
            orders_per_trade: default_orders_per_trade(),
            fallback_gas_price_gwei: default_fallback_gas_price_gwei(),
            fallback_native_usd: default_fallback_native_usd(),
        }
    }
}
