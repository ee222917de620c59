//! Append-only analytics records.
//!
//! Both records are written as one JSON object per line and never mutated
//! after creation.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::book::TokenBook;
use super::id::{MarketId, TokenId};
use super::money::{Price, Usd};

/// A profitable evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpportunityRecord {
    pub timestamp: DateTime<Utc>,
    pub market_id: MarketId,
    pub wap_yes: Price,
    pub wap_no: Price,
    pub gas_price_gwei: rust_decimal::Decimal,
    pub total_cost_usd: Usd,
    pub gross_profit: Usd,
    pub net_profit: Usd,
}

/// A processed book refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventRecord {
    pub timestamp: DateTime<Utc>,
    pub asset_id: TokenId,
    pub question: String,
    pub best_bid: Option<Price>,
    pub best_ask: Option<Price>,
}

impl EventRecord {
    /// Top-of-book record for `book` at `timestamp`.
    #[must_use]
    pub fn from_book(book: &TokenBook, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            asset_id: book.asset_id().clone(),
            question: book.question().to_owned(),
            best_bid: book.best_bid().map(|l| l.price()),
            best_ask: book.best_ask().map(|l| l.price()),
        }
    }
}
