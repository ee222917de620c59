//! HTTP friction feed: gas station plus native token price.

pub mod gas_station;
pub mod price;
pub mod settings;

use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::warn;

use crate::error::Result;
use crate::port::outbound::friction::FrictionSource;

pub use gas_station::GasStationClient;
pub use price::PriceClient;
pub use settings::FrictionConfig;

/// [`FrictionSource`] backed by the two HTTP feeds.
pub struct HttpFrictionSource {
    gas: GasStationClient,
    price: PriceClient,
}

impl HttpFrictionSource {
    #[must_use]
    pub const fn new(gas: GasStationClient, price: PriceClient) -> Self {
        Self { gas, price }
    }

    /// Build both clients from configuration and the resolved API key.
    #[must_use]
    pub fn from_config(config: &FrictionConfig, api_key: &str) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .unwrap_or_else(|err| {
                warn!(error = %err, "Failed to build HTTP client, using defaults");
                reqwest::Client::new()
            });

        Self {
            gas: GasStationClient::new(http.clone(), config.gas_station_url.clone()),
            price: PriceClient::new(
                http,
                config.price_url.clone(),
                config.price_coin_id.clone(),
                config.price_api_key_header.clone(),
                api_key,
            ),
        }
    }
}

#[async_trait]
impl FrictionSource for HttpFrictionSource {
    async fn gas_price_gwei(&self) -> Result<Decimal> {
        self.gas.gas_price_gwei().await
    }

    async fn native_usd(&self) -> Result<Decimal> {
        self.price.native_usd().await
    }
}
