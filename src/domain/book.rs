//! Order book types for market depth representation.
//!
//! This module provides types for representing per-token book state:
//!
//! - [`PriceLevel`] - A single price level with size
//! - [`Outcome`] - Which side of a binary market a token pays out on
//! - [`TokenBook`] - Complete book for a single token, linked to its pair
//!
//! # Order Book Structure
//!
//! A book has two sides:
//! - **Bids**: Buy orders, sorted by price descending (best bid first)
//! - **Asks**: Sell orders, sorted by price ascending (best ask first)
//!
//! The feed delivers full per-level snapshots, so [`TokenBook::replace_levels`]
//! swaps both sides wholesale and re-establishes the ordering.
//!
//! # Examples
//!
//! ```
//! use atomic_scanner::domain::book::{Outcome, PriceLevel, TokenBook};
//! use atomic_scanner::domain::id::{MarketId, TokenId};
//! use chrono::Utc;
//! use rust_decimal_macros::dec;
//!
//! let mut book = TokenBook::skeleton(
//!     TokenId::new("yes-token"),
//!     TokenId::new("no-token"),
//!     MarketId::new("market-1"),
//!     "Will it rain?",
//!     Outcome::Yes,
//! );
//!
//! book.replace_levels(
//!     vec![PriceLevel::new(dec!(0.44), dec!(200)), PriceLevel::new(dec!(0.45), dec!(100))],
//!     vec![PriceLevel::new(dec!(0.46), dec!(150))],
//!     Utc::now(),
//! );
//!
//! assert_eq!(book.best_bid().unwrap().price(), dec!(0.45));
//! assert_eq!(book.best_ask().unwrap().price(), dec!(0.46));
//! ```

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{MarketId, TokenId};
use super::money::{Price, Volume};

/// A single price level in an order book.
///
/// Represents aggregated orders at a specific price point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceLevel {
    /// The price at this level.
    price: Price,
    /// Total volume available at this price.
    size: Volume,
}

impl PriceLevel {
    /// Creates a new price level.
    #[must_use]
    pub const fn new(price: Price, size: Volume) -> Self {
        Self { price, size }
    }

    /// Returns the price at this level.
    #[must_use]
    pub const fn price(&self) -> Price {
        self.price
    }

    /// Returns the total volume available at this level.
    #[must_use]
    pub const fn size(&self) -> Volume {
        self.size
    }

    /// Price within (0, 1] and positive size.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.price > Decimal::ZERO && self.price <= Decimal::ONE && self.size > Decimal::ZERO
    }
}

/// Side of a binary market a token resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Yes,
    No,
}

impl Outcome {
    /// The complementary outcome.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Yes => Self::No,
            Self::No => Self::Yes,
        }
    }
}

/// Book state for a single traded token.
///
/// Every book knows the token on the other side of its market
/// (`other_side`). The store that owns the books keeps both sides of
/// a pair present together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenBook {
    asset_id: TokenId,
    other_side: TokenId,
    market_id: MarketId,
    question: String,
    outcome: Outcome,
    /// Bid (buy) levels, sorted by price descending.
    #[serde(default)]
    bids: Vec<PriceLevel>,
    /// Ask (sell) levels, sorted by price ascending.
    #[serde(default)]
    asks: Vec<PriceLevel>,
    /// When the last feed refresh was applied; `None` until the first one.
    #[serde(default)]
    last_update_ts: Option<DateTime<Utc>>,
}

impl TokenBook {
    /// Creates a book with empty sides, as produced by discovery.
    pub fn skeleton(
        asset_id: TokenId,
        other_side: TokenId,
        market_id: MarketId,
        question: impl Into<String>,
        outcome: Outcome,
    ) -> Self {
        Self {
            asset_id,
            other_side,
            market_id,
            question: question.into(),
            outcome,
            bids: Vec::new(),
            asks: Vec::new(),
            last_update_ts: None,
        }
    }

    /// Replaces both sides with a fresh snapshot and stamps the update time.
    ///
    /// Levels with a non-positive size are dropped; the remaining levels are
    /// sorted so that the best price comes first on each side.
    pub fn replace_levels(
        &mut self,
        bids: Vec<PriceLevel>,
        asks: Vec<PriceLevel>,
        at: DateTime<Utc>,
    ) {
        let mut bids: Vec<_> = bids.into_iter().filter(PriceLevel::is_valid).collect();
        let mut asks: Vec<_> = asks.into_iter().filter(PriceLevel::is_valid).collect();
        bids.sort_by(|a, b| b.price.cmp(&a.price));
        asks.sort_by(|a, b| a.price.cmp(&b.price));

        self.bids = bids;
        self.asks = asks;
        self.last_update_ts = Some(at);
    }

    /// Returns the token ID for this book.
    #[must_use]
    pub const fn asset_id(&self) -> &TokenId {
        &self.asset_id
    }

    /// Returns the paired token on the other side of the market.
    #[must_use]
    pub const fn other_side(&self) -> &TokenId {
        &self.other_side
    }

    #[must_use]
    pub const fn market_id(&self) -> &MarketId {
        &self.market_id
    }

    #[must_use]
    pub fn question(&self) -> &str {
        &self.question
    }

    #[must_use]
    pub const fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// Returns all bid levels (sorted by price descending).
    #[must_use]
    pub fn bids(&self) -> &[PriceLevel] {
        &self.bids
    }

    /// Returns all ask levels (sorted by price ascending).
    #[must_use]
    pub fn asks(&self) -> &[PriceLevel] {
        &self.asks
    }

    /// Returns the best bid (highest buy price).
    #[must_use]
    pub fn best_bid(&self) -> Option<&PriceLevel> {
        self.bids.first()
    }

    /// Returns the best ask (lowest sell price).
    #[must_use]
    pub fn best_ask(&self) -> Option<&PriceLevel> {
        self.asks.first()
    }

    #[must_use]
    pub const fn last_update_ts(&self) -> Option<DateTime<Utc>> {
        self.last_update_ts
    }

    /// Whether the book has never received a feed refresh.
    #[must_use]
    pub fn is_skeleton(&self) -> bool {
        self.last_update_ts.is_none()
    }

    /// Copy of this book with both sides cleared, as persisted in snapshots.
    #[must_use]
    pub fn to_skeleton(&self) -> Self {
        Self::skeleton(
            self.asset_id.clone(),
            self.other_side.clone(),
            self.market_id.clone(),
            self.question.clone(),
            self.outcome,
        )
    }
}
