//! Polymarket REST client for the market listing.
//!
//! The CLOB listing is cursor-paginated: `GET /markets?next_cursor=<cursor>`
//! returns a page of markets and the cursor for the next one. The API marks
//! the final page with the cursor `LTE=`.
//!
//! CLOB market objects carry no 24h volume. For open markets without one,
//! the client looks the volume up on the Gamma API (`GET /markets?condition_ids=..`)
//! and joins it in by condition id before handing the page to discovery.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use tracing::{debug, warn};

use rust_decimal::Decimal;

use super::dto::response::{parse_market, GammaMarket, PolymarketMarketsResponse};
use super::settings::PolymarketConfig;
use crate::error::Result;
use crate::port::outbound::exchange::{MarketFetcher, MarketPage};

/// Cursor value the CLOB API returns after the last page.
pub const END_CURSOR: &str = "LTE=";

/// Condition ids per Gamma volume request.
const GAMMA_BATCH: usize = 50;

/// HTTP client for the Polymarket market listing.
pub struct PolymarketClient {
    http: HttpClient,
    /// CLOB API base URL (market listing).
    base_url: String,
    /// Gamma API base URL (24h volume); `None` skips the volume join.
    gamma_url: Option<String>,
}

impl PolymarketClient {
    /// Create a client with default HTTP settings and no volume join.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: HttpClient::new(),
            base_url: base_url.into(),
            gamma_url: None,
        }
    }

    /// Join 24h volume from the Gamma API at `gamma_url`.
    #[must_use]
    pub fn with_gamma(mut self, gamma_url: impl Into<String>) -> Self {
        let url = gamma_url.into();
        self.gamma_url = Some(url.trim_end_matches('/').to_owned()).filter(|u| !u.is_empty());
        self
    }

    #[must_use]
    pub fn from_config(config: &PolymarketConfig) -> Self {
        let http = HttpClient::builder()
            .timeout(Duration::from_millis(config.http.timeout_ms))
            .connect_timeout(Duration::from_millis(config.http.connect_timeout_ms))
            .build()
            .unwrap_or_else(|err| {
                warn!(error = %err, "Failed to build HTTP client, using defaults");
                HttpClient::new()
            });

        Self {
            http,
            base_url: config.api_url.trim_end_matches('/').to_owned(),
            gamma_url: None,
        }
        .with_gamma(config.gamma_api_url.as_str())
    }

    /// Fetch one raw listing page.
    pub async fn get_markets_page(&self, cursor: &str) -> Result<PolymarketMarketsResponse> {
        let url = format!("{}/markets", self.base_url);
        debug!(url = %url, cursor = %cursor, "Fetching market page");

        let response = self
            .http
            .get(&url)
            .query(&[("next_cursor", cursor)])
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json::<PolymarketMarketsResponse>().await?)
    }

    /// 24h volume by condition id from the Gamma API.
    ///
    /// Ids Gamma does not know are absent from the map.
    pub async fn get_gamma_volumes(&self, condition_ids: &[String]) -> Result<HashMap<String, Decimal>> {
        let mut volumes = HashMap::with_capacity(condition_ids.len());
        let Some(gamma_url) = self.gamma_url.as_deref() else {
            return Ok(volumes);
        };
        let url = format!("{gamma_url}/markets");

        for batch in condition_ids.chunks(GAMMA_BATCH) {
            let limit = batch.len().to_string();
            let mut query: Vec<(&str, &str)> = batch.iter().map(|id| ("condition_ids", id.as_str())).collect();
            query.push(("limit", limit.as_str()));
            debug!(url = %url, count = batch.len(), "Fetching Gamma volumes");

            let markets = self
                .http
                .get(&url)
                .query(&query)
                .send()
                .await?
                .error_for_status()?
                .json::<Vec<GammaMarket>>()
                .await?;

            volumes.extend(
                markets
                    .into_iter()
                    .filter_map(|m| m.volume_24h().map(|v| (m.condition_id, v))),
            );
        }
        Ok(volumes)
    }
}

#[async_trait]
impl MarketFetcher for PolymarketClient {
    async fn fetch_page(&self, cursor: &str) -> Result<MarketPage> {
        let response = self.get_markets_page(cursor).await?;
        let raw_count = response.data.len();
        let parsed: Vec<_> = response.data.into_iter().filter_map(parse_market).collect();

        let missing: Vec<String> = parsed
            .iter()
            .filter(|m| m.needs_volume())
            .map(|m| m.condition_id.clone())
            .collect();
        let volumes = if missing.is_empty() {
            HashMap::new()
        } else {
            self.get_gamma_volumes(&missing).await?
        };
        if !missing.is_empty() && self.gamma_url.is_some() {
            debug!(missing = missing.len(), joined = volumes.len(), "Joined Gamma volumes");
        }

        let markets: Vec<_> = parsed
            .into_iter()
            .map(|m| {
                let joined = volumes.get(&m.condition_id).copied();
                m.into_market_with_volume(joined)
            })
            .collect();

        if markets.len() < raw_count {
            debug!(
                skipped = raw_count - markets.len(),
                "Skipped malformed market objects"
            );
        }

        Ok(MarketPage {
            markets,
            next_cursor: response.next_cursor,
        })
    }

    fn is_terminal_cursor(&self, cursor: &str) -> bool {
        cursor.is_empty() || cursor == END_CURSOR
    }

    fn exchange_name(&self) -> &'static str {
        "Polymarket"
    }
}
