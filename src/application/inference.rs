//! Inference worker: evaluates debounced market pairs off the receive path.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tokio::sync::mpsc;
use tracing::{debug, info};

use super::cache::book::BookStore;
use super::friction::FrictionSlot;
use super::journal::JournalHandle;
use crate::domain::{
    friction::FrictionState,
    id::{MarketId, TokenId},
    inference::{evaluate, Friction, Verdict},
    money::Volume,
    record::OpportunityRecord,
};

/// A request to evaluate the market a refreshed token belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferenceJob {
    pub asset_id: TokenId,
    pub market_id: MarketId,
    pub scheduled_at: DateTime<Utc>,
}

/// Evaluation parameters.
#[derive(Debug, Clone, Copy)]
pub struct InferenceSettings {
    pub target_size: Volume,
    pub fee_rate: Decimal,
    pub gas_units_per_order: u64,
    pub orders_per_trade: u32,
    /// Skip pairs where either side is older than this. `None` disables the check.
    pub max_book_age: Option<Duration>,
}

/// One evaluated pair.
#[derive(Debug, Clone)]
pub struct Assessment {
    pub market_id: MarketId,
    pub question: String,
    pub verdict: Verdict,
    pub friction: FrictionState,
}

impl Assessment {
    /// Journal record for a profitable verdict.
    #[must_use]
    pub fn opportunity(&self, timestamp: DateTime<Utc>) -> Option<OpportunityRecord> {
        if !self.verdict.is_arbitrage {
            return None;
        }
        Some(OpportunityRecord {
            timestamp,
            market_id: self.market_id.clone(),
            wap_yes: self.verdict.wap_yes?,
            wap_no: self.verdict.wap_no?,
            gas_price_gwei: self.friction.gas_price_gwei,
            total_cost_usd: self.verdict.total_cost_usd,
            gross_profit: self.verdict.gross_profit,
            net_profit: self.verdict.expected_return_usd,
        })
    }
}

/// Counters reported when the worker stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InferenceStats {
    pub evaluated: u64,
    pub opportunities: u64,
    pub untradable: u64,
    pub skipped: u64,
}

/// Drains [`InferenceJob`]s and journals profitable verdicts.
pub struct InferenceWorker {
    store: Arc<BookStore>,
    friction: FrictionSlot,
    settings: InferenceSettings,
    opportunities: JournalHandle<OpportunityRecord>,
    rx: mpsc::Receiver<InferenceJob>,
}

impl InferenceWorker {
    #[must_use]
    pub fn new(
        store: Arc<BookStore>,
        friction: FrictionSlot,
        settings: InferenceSettings,
        opportunities: JournalHandle<OpportunityRecord>,
        rx: mpsc::Receiver<InferenceJob>,
    ) -> Self {
        Self {
            store,
            friction,
            settings,
            opportunities,
            rx,
        }
    }

    /// Evaluate the pair behind `job` as of `now`.
    ///
    /// Returns `None` when the pair is unknown or too stale to evaluate.
    #[must_use]
    pub fn assess(&self, job: &InferenceJob, now: DateTime<Utc>) -> Option<Assessment> {
        let (yes, no) = self.store.market_pair(&job.asset_id)?;

        if let Some(max_age) = self.settings.max_book_age {
            let max_age = chrono::Duration::from_std(max_age).ok()?;
            let stale = [&yes, &no].iter().any(|book| match book.last_update_ts() {
                Some(ts) => now - ts > max_age,
                None => true,
            });
            if stale {
                debug!(market_id = %job.market_id, "Skipping evaluation of stale pair");
                return None;
            }
        }

        let friction = self.friction.read();
        let gas_cost_usd =
            friction.gas_cost_usd(self.settings.gas_units_per_order, self.settings.orders_per_trade);
        let verdict = evaluate(
            self.settings.target_size,
            yes.asks(),
            no.asks(),
            Friction {
                gas_cost_usd,
                fee_rate: self.settings.fee_rate,
            },
        );

        Some(Assessment {
            market_id: yes.market_id().clone(),
            question: yes.question().to_owned(),
            verdict,
            friction,
        })
    }

    /// Process jobs until every sender is dropped.
    pub async fn run(mut self) -> InferenceStats {
        let mut stats = InferenceStats::default();

        while let Some(job) = self.rx.recv().await {
            let now = Utc::now();
            let Some(assessment) = self.assess(&job, now) else {
                stats.skipped += 1;
                continue;
            };
            stats.evaluated += 1;
            self.report(&assessment, now, &mut stats).await;
        }

        info!(
            evaluated = stats.evaluated,
            opportunities = stats.opportunities,
            untradable = stats.untradable,
            skipped = stats.skipped,
            "Inference worker stopped"
        );
        stats
    }

    async fn report(&self, assessment: &Assessment, now: DateTime<Utc>, stats: &mut InferenceStats) {
        let verdict = &assessment.verdict;

        if verdict.untradable {
            stats.untradable += 1;
            debug!(market_id = %assessment.market_id, "Insufficient depth for target size");
            return;
        }

        if let Some(record) = assessment.opportunity(now) {
            stats.opportunities += 1;
            info!(
                market_id = %assessment.market_id,
                question = %assessment.question,
                wap_yes = %record.wap_yes,
                wap_no = %record.wap_no,
                gross_profit = %record.gross_profit,
                net_profit = %record.net_profit,
                "Arbitrage opportunity"
            );
            self.opportunities.record(record).await;
        } else if verdict.is_gross_only() {
            info!(
                market_id = %assessment.market_id,
                gross_profit = %verdict.gross_profit,
                total_cost_usd = %verdict.total_cost_usd,
                "Profitable before costs only"
            );
        }
    }
}
