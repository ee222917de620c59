//! Polygon gas station client.
//!
//! The v2 endpoint answers with fee tiers in gwei:
//!
//! ```json
//! {"safeLow": {"maxPriorityFee": 30.1, "maxFee": 31.2},
//!  "standard": {"maxPriorityFee": 32.5, "maxFee": 33.6},
//!  "fast": {"maxPriorityFee": 40.0, "maxFee": 41.1},
//!  "estimatedBaseFee": 1.1, "blockTime": 2, "blockNumber": 1}
//! ```
//!
//! The `standard` tier's `maxFee` is used as the gas price.

use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};

#[derive(Debug, Deserialize)]
pub struct GasTier {
    #[serde(rename = "maxFee")]
    pub max_fee: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct GasStationResponse {
    pub standard: GasTier,
}

/// Client for a gas station endpoint.
pub struct GasStationClient {
    http: reqwest::Client,
    url: String,
}

impl GasStationClient {
    #[must_use]
    pub fn new(http: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }

    /// Fetch the current standard-tier gas price in gwei.
    pub async fn gas_price_gwei(&self) -> Result<Decimal> {
        let response: GasStationResponse = self
            .http
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let gwei = response.standard.max_fee;
        if gwei <= Decimal::ZERO {
            return Err(Error::Feed(format!("non-positive gas price: {gwei}")));
        }
        debug!(gas_price_gwei = %gwei, "Fetched gas price");
        Ok(gwei)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn parses_standard_tier() {
        let json = r#"{
            "safeLow": {"maxPriorityFee": 30.1, "maxFee": 31.2},
            "standard": {"maxPriorityFee": 32.5, "maxFee": 33.6},
            "fast": {"maxPriorityFee": 40.0, "maxFee": 41.1},
            "estimatedBaseFee": 1.1
        }"#;
        let response: GasStationResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.standard.max_fee, dec!(33.6));
    }
}
