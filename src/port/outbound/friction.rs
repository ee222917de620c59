//! Port for network fee and conversion-rate feeds.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::error::Error;

/// Source of the two inputs needed to price on-chain order placement.
#[async_trait]
pub trait FrictionSource: Send + Sync {
    /// Current gas price in gwei.
    async fn gas_price_gwei(&self) -> Result<Decimal, Error>;

    /// Current USD price of the native token.
    async fn native_usd(&self) -> Result<Decimal, Error>;
}
