//! Fixed or failing [`FrictionSource`].

use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::error::{Error, Result};
use crate::port::outbound::friction::FrictionSource;

pub struct FakeFrictionSource {
    values: Option<(Decimal, Decimal)>,
    calls: AtomicU32,
}

impl FakeFrictionSource {
    /// Always returns `gas_price_gwei` and `native_usd`.
    pub fn new(gas_price_gwei: Decimal, native_usd: Decimal) -> Self {
        Self {
            values: Some((gas_price_gwei, native_usd)),
            calls: AtomicU32::new(0),
        }
    }

    /// Every fetch fails.
    pub fn failing() -> Self {
        Self {
            values: None,
            calls: AtomicU32::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    fn get(&self, pick: impl Fn((Decimal, Decimal)) -> Decimal) -> Result<Decimal> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.values
            .map(pick)
            .ok_or_else(|| Error::Feed("scripted failure".into()))
    }
}

#[async_trait]
impl FrictionSource for FakeFrictionSource {
    async fn gas_price_gwei(&self) -> Result<Decimal> {
        self.get(|(gas, _)| gas)
    }

    async fn native_usd(&self) -> Result<Decimal> {
        self.get(|(_, usd)| usd)
    }
}
