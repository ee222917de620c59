//! Market-related domain types.
//!
//! - [`Market`] - A binary prediction market as returned by discovery
//! - [`MIN_VOLUME_THRESHOLD`] - Default 24h volume floor for pruning

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::book::{Outcome, TokenBook};
use super::id::{MarketId, TokenId};

/// Default minimum 24h volume (USD) for a market to be subscribed.
pub const MIN_VOLUME_THRESHOLD: Decimal = dec!(1000);

/// A market as listed by the discovery API.
///
/// Token ids are kept in outcome order: the YES token first, the NO token
/// second. Markets with any other token count are carried so they can be
/// reported, but are never tradable.
#[derive(Debug, Clone, PartialEq)]
pub struct Market {
    market_id: MarketId,
    question: String,
    tokens: Vec<TokenId>,
    volume_24h: Decimal,
    accepting_orders: bool,
    closed: bool,
}

impl Market {
    /// Create a new market.
    pub fn new(
        market_id: MarketId,
        question: impl Into<String>,
        tokens: Vec<TokenId>,
        volume_24h: Decimal,
        accepting_orders: bool,
        closed: bool,
    ) -> Self {
        Self {
            market_id,
            question: question.into(),
            tokens,
            volume_24h,
            accepting_orders,
            closed,
        }
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
    pub fn tokens(&self) -> &[TokenId] {
        &self.tokens
    }

    #[must_use]
    pub const fn volume_24h(&self) -> Decimal {
        self.volume_24h
    }

    #[must_use]
    pub const fn accepting_orders(&self) -> bool {
        self.accepting_orders
    }

    #[must_use]
    pub const fn closed(&self) -> bool {
        self.closed
    }

    /// YES token, when the market has exactly two valid tokens.
    #[must_use]
    pub fn token_yes(&self) -> Option<&TokenId> {
        self.valid_pair().map(|(yes, _)| yes)
    }

    /// NO token, when the market has exactly two valid tokens.
    #[must_use]
    pub fn token_no(&self) -> Option<&TokenId> {
        self.valid_pair().map(|(_, no)| no)
    }

    /// Exactly two non-empty, distinct token ids.
    fn valid_pair(&self) -> Option<(&TokenId, &TokenId)> {
        match self.tokens.as_slice() {
            [yes, no] if !yes.as_str().is_empty() && !no.as_str().is_empty() && yes != no => {
                Some((yes, no))
            }
            _ => None,
        }
    }

    /// Whether the market qualifies for subscription.
    ///
    /// Requires the market to accept orders, be open, meet the volume floor
    /// and have exactly two valid token identifiers.
    #[must_use]
    pub fn is_tradable(&self, min_volume_24h: Decimal) -> bool {
        self.accepting_orders
            && !self.closed
            && self.volume_24h >= min_volume_24h
            && self.valid_pair().is_some()
    }

    /// Linked skeleton books for both sides, YES first.
    #[must_use]
    pub fn book_pair(&self) -> Option<(TokenBook, TokenBook)> {
        let (yes, no) = self.valid_pair()?;
        let yes_book = TokenBook::skeleton(
            yes.clone(),
            no.clone(),
            self.market_id.clone(),
            self.question.clone(),
            Outcome::Yes,
        );
        let no_book = TokenBook::skeleton(
            no.clone(),
            yes.clone(),
            self.market_id.clone(),
            self.question.clone(),
            Outcome::No,
        );
        Some((yes_book, no_book))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn market(tokens: &[&str], volume: Decimal, accepting: bool, closed: bool) -> Market {
        Market::new(
            MarketId::new("m-1"),
            "Will it rain?",
            tokens.iter().map(|t| TokenId::from(*t)).collect(),
            volume,
            accepting,
            closed,
        )
    }

    #[test]
    fn open_liquid_binary_market_is_tradable() {
        let m = market(&["yes", "no"], dec!(1000), true, false);
        assert!(m.is_tradable(MIN_VOLUME_THRESHOLD));
    }

    #[test]
    fn volume_below_threshold_is_pruned() {
        let m = market(&["yes", "no"], dec!(999.99), true, false);
        assert!(!m.is_tradable(MIN_VOLUME_THRESHOLD));
    }

    #[test]
    fn closed_or_not_accepting_is_not_tradable() {
        assert!(!market(&["yes", "no"], dec!(5000), true, true).is_tradable(MIN_VOLUME_THRESHOLD));
        assert!(!market(&["yes", "no"], dec!(5000), false, false).is_tradable(MIN_VOLUME_THRESHOLD));
    }

    #[test]
    fn token_count_must_be_exactly_two() {
        assert!(!market(&["only"], dec!(5000), true, false).is_tradable(MIN_VOLUME_THRESHOLD));
        assert!(!market(&["a", "b", "c"], dec!(5000), true, false).is_tradable(MIN_VOLUME_THRESHOLD));
        assert!(!market(&[], dec!(5000), true, false).is_tradable(MIN_VOLUME_THRESHOLD));
    }

    #[test]
    fn empty_or_duplicate_tokens_are_invalid() {
        assert!(!market(&["", "no"], dec!(5000), true, false).is_tradable(MIN_VOLUME_THRESHOLD));
        assert!(!market(&["same", "same"], dec!(5000), true, false).is_tradable(MIN_VOLUME_THRESHOLD));
    }

    #[test]
    fn book_pair_links_each_side_to_the_other() {
        let m = market(&["yes", "no"], dec!(5000), true, false);
        let (yes, no) = m.book_pair().unwrap();

        assert_eq!(yes.asset_id().as_str(), "yes");
        assert_eq!(yes.other_side().as_str(), "no");
        assert_eq!(yes.outcome(), Outcome::Yes);
        assert_eq!(no.asset_id().as_str(), "no");
        assert_eq!(no.other_side().as_str(), "yes");
        assert_eq!(no.outcome(), Outcome::No);
        assert_eq!(no.question(), "Will it rain?");
    }

    #[test]
    fn book_pair_requires_valid_tokens() {
        let m = market(&["a", "b", "c"], dec!(5000), true, false);
        assert!(m.book_pair().is_none());
        assert!(m.token_yes().is_none());
    }
}
