//! Polymarket REST API response types.
//!
//! Market objects are not schema-stable across API surfaces: token ids show
//! up as a JSON-encoded string (`clobTokenIds`), as arrays under several
//! names, or nested inside `tokens[]`. Volume fields vary the same way. The
//! typed fields below cover the stable part; everything else lands in
//! `extra` and is resolved by prioritized lookup.
//!
//! The CLOB listing carries no 24h volume at all. Gamma market objects do,
//! keyed by the same condition id, so volume is joined in from there.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::domain::{id::MarketId, id::TokenId, market::Market};

/// Token id fields in lookup order.
const TOKEN_ID_FIELDS: [&str; 2] = ["clobTokenIds", "clob_token_ids"];

/// 24h volume fields in lookup order.
const VOLUME_FIELDS: [&str; 4] = [
    "volume24hr",
    "volume_24hr",
    "volume24hrClob",
    "volume_num_24hr",
];

/// Paginated listing response.
#[derive(Debug, Deserialize)]
pub struct PolymarketMarketsResponse {
    /// Raw market objects; each is decoded individually so one bad entry
    /// does not discard the page.
    #[serde(default)]
    pub data: Vec<Value>,
    #[serde(default, alias = "nextCursor")]
    pub next_cursor: Option<String>,
}

/// Token entry embedded in CLOB market objects.
#[derive(Debug, Clone, Deserialize)]
pub struct PolymarketToken {
    pub token_id: String,
    #[serde(default)]
    pub outcome: Option<String>,
}

/// A single market object from the listing.
#[derive(Debug, Clone, Deserialize)]
pub struct PolymarketMarket {
    #[serde(alias = "conditionId", alias = "market_id")]
    pub condition_id: String,
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default, alias = "acceptingOrders")]
    pub accepting_orders: Option<bool>,
    #[serde(default)]
    pub closed: Option<bool>,
    #[serde(default)]
    pub tokens: Option<Vec<PolymarketToken>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PolymarketMarket {
    /// Token ids in YES, NO order when outcome labels allow it, positional otherwise.
    ///
    /// Looks at `clobTokenIds`, `clob_token_ids`, `tokens[].token_id` and
    /// finally `token_ids`, taking the first that yields any ids.
    pub fn token_ids(&self) -> Vec<String> {
        for field in TOKEN_ID_FIELDS {
            if let Some(ids) = self.extra.get(field).and_then(string_list) {
                if !ids.is_empty() {
                    let labels = self.extra.get("outcomes").and_then(string_list);
                    return order_by_outcome(ids, labels.as_deref());
                }
            }
        }

        if let Some(tokens) = self.tokens.as_deref().filter(|t| !t.is_empty()) {
            let labels: Option<Vec<String>> = tokens.iter().map(|t| t.outcome.clone()).collect();
            let ids = tokens.iter().map(|t| t.token_id.clone()).collect();
            return order_by_outcome(ids, labels.as_deref());
        }

        self.extra
            .get("token_ids")
            .and_then(string_list)
            .unwrap_or_default()
    }

    /// 24h volume from the first present field, if the object carries one.
    pub fn listed_volume(&self) -> Option<Decimal> {
        volume_in(&self.extra)
    }

    /// 24h volume; missing counts as zero.
    pub fn volume_24h(&self) -> Decimal {
        self.listed_volume().unwrap_or(Decimal::ZERO)
    }

    /// Open for trading but without a volume of its own.
    pub fn needs_volume(&self) -> bool {
        self.accepting_orders == Some(true)
            && self.closed != Some(true)
            && self.listed_volume().is_none()
    }

    /// Convert into the domain model. Missing flags count as not accepting
    /// orders and not closed.
    pub fn into_market(self) -> Market {
        self.into_market_with_volume(None)
    }

    /// Convert, using `joined` when the object has no volume field.
    pub fn into_market_with_volume(self, joined: Option<Decimal>) -> Market {
        let tokens = self.token_ids().into_iter().map(TokenId::from).collect();
        let volume = self.listed_volume().or(joined).unwrap_or(Decimal::ZERO);
        Market::new(
            MarketId::from(self.condition_id),
            self.question.unwrap_or_default(),
            tokens,
            volume,
            self.accepting_orders.unwrap_or(false),
            self.closed.unwrap_or(false),
        )
    }
}

/// Market object from the Gamma API, read only for its volume.
#[derive(Debug, Clone, Deserialize)]
pub struct GammaMarket {
    #[serde(alias = "conditionId")]
    pub condition_id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GammaMarket {
    pub fn volume_24h(&self) -> Option<Decimal> {
        volume_in(&self.extra)
    }
}

/// Parse one raw market object, logging and skipping malformed ones.
pub fn parse_market(raw: Value) -> Option<PolymarketMarket> {
    serde_json::from_value::<PolymarketMarket>(raw)
        .map_err(|e| debug!(error = %e, "Skipping malformed market object"))
        .ok()
}

/// Decode one raw market object into the domain model.
pub fn decode_market(raw: Value) -> Option<Market> {
    parse_market(raw).map(PolymarketMarket::into_market)
}

fn volume_in(fields: &Map<String, Value>) -> Option<Decimal> {
    VOLUME_FIELDS
        .iter()
        .find_map(|field| fields.get(*field).and_then(decimal_value))
}

/// A list of strings, either as a JSON array or as a JSON-encoded string.
fn string_list(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect(),
        Value::String(encoded) => serde_json::from_str::<Vec<String>>(encoded)
            .map_err(|e| debug!(error = %e, raw = %encoded, "Failed to parse encoded list"))
            .ok(),
        _ => None,
    }
}

fn decimal_value(value: &Value) -> Option<Decimal> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_owned(),
        _ => return None,
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

/// Put the YES token first when labels identify both sides.
fn order_by_outcome(ids: Vec<String>, labels: Option<&[String]>) -> Vec<String> {
    let Some(labels) = labels else {
        return ids;
    };
    if ids.len() != 2 || labels.len() != 2 {
        return ids;
    }
    let is = |label: &str, want: &str| label.trim().eq_ignore_ascii_case(want);
    match (labels[0].as_str(), labels[1].as_str()) {
        (a, b) if is(a, "no") && is(b, "yes") => vec![ids[1].clone(), ids[0].clone()],
        _ => ids,
    }
}
