//! Native token USD price client.
//!
//! Speaks the simple-price shape: `GET <url>?ids=<coin>&vs_currencies=usd`
//! answered by `{"<coin>": {"usd": 0.52}}`. The API key travels in a header.

use std::collections::HashMap;

use rust_decimal::Decimal;
use tracing::debug;

use crate::error::{Error, Result};

type SimplePriceResponse = HashMap<String, HashMap<String, Decimal>>;

/// Client for a simple-price endpoint.
pub struct PriceClient {
    http: reqwest::Client,
    url: String,
    coin_id: String,
    api_key_header: String,
    api_key: String,
}

impl PriceClient {
    #[must_use]
    pub fn new(
        http: reqwest::Client,
        url: impl Into<String>,
        coin_id: impl Into<String>,
        api_key_header: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            http,
            url: url.into(),
            coin_id: coin_id.into(),
            api_key_header: api_key_header.into(),
            api_key: api_key.into(),
        }
    }

    /// Fetch the current USD price of the configured coin.
    pub async fn native_usd(&self) -> Result<Decimal> {
        let response: SimplePriceResponse = self
            .http
            .get(&self.url)
            .query(&[("ids", self.coin_id.as_str()), ("vs_currencies", "usd")])
            .header(self.api_key_header.as_str(), self.api_key.as_str())
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let price = response
            .get(&self.coin_id)
            .and_then(|quotes| quotes.get("usd"))
            .copied()
            .ok_or_else(|| Error::Feed(format!("no usd quote for {}", self.coin_id)))?;

        if price <= Decimal::ZERO {
            return Err(Error::Feed(format!("non-positive usd quote: {price}")));
        }
        debug!(native_usd = %price, coin = %self.coin_id, "Fetched native price");
        Ok(price)
    }
}
