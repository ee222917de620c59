//! Builders for domain primitives used across tests.

use rust_decimal::Decimal;

use crate::domain::{
    book::{Outcome, PriceLevel, TokenBook},
    id::{MarketId, TokenId},
    market::Market,
};

/// Generate `n` token IDs named `t0`, `t1`, ..., `t{n-1}`.
pub fn make_tokens(n: usize) -> Vec<TokenId> {
    (0..n).map(|i| TokenId::from(format!("t{i}"))).collect()
}

/// Create a [`TokenId`] from a string.
pub fn token(id: &str) -> TokenId {
    TokenId::from(id)
}

/// Create a [`MarketId`] from a string.
pub fn market_id(id: &str) -> MarketId {
    MarketId::from(id)
}

/// A price level.
pub fn level(price: Decimal, size: Decimal) -> PriceLevel {
    PriceLevel::new(price, size)
}

/// An open, accepting binary market with tokens `{id}-yes` / `{id}-no`.
pub fn binary_market(id: &str, volume_24h: Decimal) -> Market {
    Market::new(
        market_id(id),
        format!("Will {id} happen?"),
        vec![token(&format!("{id}-yes")), token(&format!("{id}-no"))],
        volume_24h,
        true,
        false,
    )
}

/// Skeleton books for both sides of market `id`.
pub fn book_pair(id: &str) -> (TokenBook, TokenBook) {
    let yes = token(&format!("{id}-yes"));
    let no = token(&format!("{id}-no"));
    let question = format!("Will {id} happen?");
    (
        TokenBook::skeleton(yes.clone(), no.clone(), market_id(id), question.clone(), Outcome::Yes),
        TokenBook::skeleton(no, yes, market_id(id), question, Outcome::No),
    )
}

/// A market-channel `book` frame with the given ask levels and no bids.
pub fn book_frame(asset_id: &str, asks: &[(&str, &str)]) -> String {
    let asks: Vec<serde_json::Value> = asks
        .iter()
        .map(|(price, size)| serde_json::json!({ "price": price, "size": size }))
        .collect();
    serde_json::json!([{
        "event_type": "book",
        "asset_id": asset_id,
        "bids": [],
        "asks": asks,
    }])
    .to_string()
}
