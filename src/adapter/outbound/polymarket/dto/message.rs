//! Polymarket WebSocket message types.
//!
//! The market channel sends either a JSON array of event objects or a single
//! event object. Book events carry the full per-level state of one token:
//!
//! ```json
//! [{"event_type":"book","market":"0x...","asset_id":"123...","timestamp":"1234","hash":"abc","bids":[...],"asks":[...]}]
//! ```
//!
//! Levels arrive as `{"price": "0.45", "size": "100"}` objects or as
//! `["0.45", "100"]` pairs; numbers may be strings or JSON numbers.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::book::PriceLevel;

/// Application-level keepalive sent by the client.
pub const PING: &str = "PING";

/// Server reply to [`PING`].
pub const PONG: &str = "PONG";

/// Subscription request sent to Polymarket WebSocket
#[derive(Debug, Serialize)]
pub struct PolymarketSubscribeMessage {
    pub assets_ids: Vec<String>,
    #[serde(rename = "type")]
    pub msg_type: String,
}

impl PolymarketSubscribeMessage {
    pub fn new(asset_ids: Vec<String>) -> Self {
        Self {
            assets_ids: asset_ids,
            msg_type: "market".into(),
        }
    }
}

/// Book event for a single token.
#[derive(Debug, Deserialize)]
pub struct PolymarketBookMessage {
    pub asset_id: String,
    #[serde(default)]
    pub market: Option<String>,
    #[serde(alias = "buys")]
    pub bids: Vec<PolymarketWsPriceLevel>,
    #[serde(alias = "sells")]
    pub asks: Vec<PolymarketWsPriceLevel>,
    #[serde(default)]
    pub timestamp: Option<serde_json::Value>,
    #[serde(default)]
    pub hash: Option<String>,
}

impl PolymarketBookMessage {
    /// Parsed bid levels; unparseable entries are skipped.
    #[must_use]
    pub fn bid_levels(&self) -> Vec<PriceLevel> {
        Self::parse_levels(&self.bids)
    }

    /// Parsed ask levels; unparseable entries are skipped.
    #[must_use]
    pub fn ask_levels(&self) -> Vec<PriceLevel> {
        Self::parse_levels(&self.asks)
    }

    fn parse_levels(levels: &[PolymarketWsPriceLevel]) -> Vec<PriceLevel> {
        let parsed: Vec<_> = levels
            .iter()
            .filter_map(PolymarketWsPriceLevel::to_level)
            .filter(PriceLevel::is_valid)
            .collect();
        if parsed.len() < levels.len() {
            debug!(
                dropped = levels.len() - parsed.len(),
                "Dropped unparseable or out-of-range levels"
            );
        }
        parsed
    }
}

/// Price level as received from WebSocket.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PolymarketWsPriceLevel {
    Object { price: WsNumber, size: WsNumber },
    Pair(WsNumber, WsNumber),
}

impl PolymarketWsPriceLevel {
    fn to_level(&self) -> Option<PriceLevel> {
        let (price, size) = match self {
            Self::Object { price, size } | Self::Pair(price, size) => (price, size),
        };
        Some(PriceLevel::new(price.to_decimal()?, size.to_decimal()?))
    }
}

/// A numeric field sent either as a string or as a JSON number.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WsNumber {
    Text(String),
    Number(serde_json::Number),
}

impl WsNumber {
    fn to_decimal(&self) -> Option<Decimal> {
        let text = match self {
            Self::Text(s) => s.trim().to_owned(),
            Self::Number(n) => n.to_string(),
        };
        Decimal::from_str(&text)
            .or_else(|_| Decimal::from_scientific(&text))
            .ok()
    }
}
