//! Depth-aware arbitrage evaluation.
//!
//! Buying `target_size` shares of both outcomes of a binary market locks in a
//! payout of `target_size` dollars. The trade is worth taking when the cost of
//! walking both ask ladders, plus network and exchange friction, stays below
//! that payout.
//!
//! Everything here is pure: no clocks, no I/O, no shared state. All arithmetic
//! is done in [`Decimal`] so identical inputs always give identical outputs.

use rust_decimal::Decimal;
use serde::Serialize;

use super::book::PriceLevel;
use super::money::{Price, Usd, Volume};

/// Result of walking an ask ladder for a fixed size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fill {
    /// Weighted average execution price.
    pub wap: Price,
    /// Total cost of the fill.
    pub cost: Usd,
    /// Number of levels touched, including a partially consumed last level.
    pub levels_consumed: usize,
}

/// Weighted average price to buy `target_size` from `asks` (best first).
///
/// Only the portion of the last level needed to reach the target is counted.
/// Levels priced outside (0, 1] or with no size are skipped. Returns `None`
/// when the ladder is shallower than the target, the target is not positive,
/// or the cost overflows.
#[must_use]
pub fn weighted_average_price(target_size: Volume, asks: &[PriceLevel]) -> Option<Fill> {
    if target_size <= Decimal::ZERO {
        return None;
    }

    let mut remaining = target_size;
    let mut cost = Decimal::ZERO;
    let mut levels_consumed = 0;

    for level in asks {
        if remaining.is_zero() {
            break;
        }
        if !level.is_valid() {
            continue;
        }
        let take = remaining.min(level.size());
        cost = cost.checked_add(take.checked_mul(level.price())?)?;
        remaining -= take;
        levels_consumed += 1;
    }

    if remaining > Decimal::ZERO {
        return None;
    }

    Some(Fill {
        wap: cost.checked_div(target_size)?,
        cost,
        levels_consumed,
    })
}

/// Non-price execution costs for one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Friction {
    /// Network cost of placing both orders, in USD.
    pub gas_cost_usd: Usd,
    /// Exchange fee as a fraction of notional (0.01 = 1%).
    pub fee_rate: Decimal,
}

/// Outcome of evaluating a market pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Verdict {
    /// Net profit is strictly positive.
    pub is_arbitrage: bool,
    /// At least one side lacks the depth to fill the target size.
    pub untradable: bool,
    pub wap_yes: Option<Price>,
    pub wap_no: Option<Price>,
    /// Profit before friction: `(1 - (wap_yes + wap_no)) * target_size`.
    pub gross_profit: Usd,
    pub exchange_fees_usd: Usd,
    /// Gas plus exchange fees.
    pub total_cost_usd: Usd,
    /// Net profit after friction.
    pub expected_return_usd: Usd,
}

impl Verdict {
    fn untradable(wap_yes: Option<Price>, wap_no: Option<Price>) -> Self {
        Self {
            is_arbitrage: false,
            untradable: true,
            wap_yes,
            wap_no,
            gross_profit: Decimal::ZERO,
            exchange_fees_usd: Decimal::ZERO,
            total_cost_usd: Decimal::ZERO,
            expected_return_usd: Decimal::ZERO,
        }
    }

    /// Profitable before friction but not after it.
    #[must_use]
    pub fn is_gross_only(&self) -> bool {
        !self.untradable && self.gross_profit > Decimal::ZERO && !self.is_arbitrage
    }
}

/// Evaluate buying `target_size` of both outcomes.
///
/// `yes_asks` and `no_asks` must be sorted best (lowest) price first.
#[must_use]
pub fn evaluate(
    target_size: Volume,
    yes_asks: &[PriceLevel],
    no_asks: &[PriceLevel],
    friction: Friction,
) -> Verdict {
    let yes = weighted_average_price(target_size, yes_asks);
    let no = weighted_average_price(target_size, no_asks);

    let (yes, no) = match (yes, no) {
        (Some(yes), Some(no)) => (yes, no),
        (yes, no) => return Verdict::untradable(yes.map(|f| f.wap), no.map(|f| f.wap)),
    };

    let priced = price_pair(target_size, yes.wap, no.wap, friction);
    let Some((gross_profit, exchange_fees_usd, total_cost_usd, net)) = priced else {
        return Verdict::untradable(Some(yes.wap), Some(no.wap));
    };

    Verdict {
        is_arbitrage: net > Decimal::ZERO,
        untradable: false,
        wap_yes: Some(yes.wap),
        wap_no: Some(no.wap),
        gross_profit,
        exchange_fees_usd,
        total_cost_usd,
        expected_return_usd: net,
    }
}

/// Gross, fees, total cost and net; `None` on overflow.
fn price_pair(
    target_size: Volume,
    wap_yes: Price,
    wap_no: Price,
    friction: Friction,
) -> Option<(Usd, Usd, Usd, Usd)> {
    let price_sum = wap_yes.checked_add(wap_no)?;
    let gross_profit = Decimal::ONE.checked_sub(price_sum)?.checked_mul(target_size)?;
    let exchange_fees_usd = price_sum.checked_mul(target_size)?.checked_mul(friction.fee_rate)?;
    let total_cost_usd = friction.gas_cost_usd.checked_add(exchange_fees_usd)?;
    let net = gross_profit.checked_sub(total_cost_usd)?;
    Some((gross_profit, exchange_fees_usd, total_cost_usd, net))
}
