//! Network execution cost.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

use super::money::Usd;

const GWEI_PER_NATIVE: Decimal = dec!(1000000000);

/// Latest published network fee parameters.
///
/// Values are small and `Copy`, so readers take a snapshot under a read lock
/// and never observe a half-written update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FrictionState {
    /// Gas price in gwei.
    pub gas_price_gwei: Decimal,
    /// Price of one unit of the native token in USD.
    pub native_to_usd_rate: Decimal,
    /// `None` while the state still holds configured fallback values.
    pub last_refreshed: Option<DateTime<Utc>>,
}

impl FrictionState {
    /// State seeded from configuration before the first successful fetch.
    #[must_use]
    pub const fn fallback(gas_price_gwei: Decimal, native_to_usd_rate: Decimal) -> Self {
        Self {
            gas_price_gwei,
            native_to_usd_rate,
            last_refreshed: None,
        }
    }

    /// USD cost of `orders` on-chain placements of `gas_units_per_order` each.
    #[must_use]
    pub fn gas_cost_usd(&self, gas_units_per_order: u64, orders: u32) -> Usd {
        let units = Decimal::from(gas_units_per_order) * Decimal::from(orders);
        units * self.gas_price_gwei / GWEI_PER_NATIVE * self.native_to_usd_rate
    }
}
