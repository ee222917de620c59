//! Periodic friction refresh into a shared read slot.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use parking_lot::RwLock;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::domain::friction::FrictionState;
use crate::error::Result;
use crate::port::outbound::friction::FrictionSource;

/// Shared, read-mostly friction value. Last write wins.
#[derive(Clone)]
pub struct FrictionSlot(Arc<RwLock<FrictionState>>);

impl FrictionSlot {
    #[must_use]
    pub fn new(initial: FrictionState) -> Self {
        Self(Arc::new(RwLock::new(initial)))
    }

    /// Current value. Never waits on a fetch.
    #[must_use]
    pub fn read(&self) -> FrictionState {
        *self.0.read()
    }

    pub fn publish(&self, state: FrictionState) {
        *self.0.write() = state;
    }
}

/// Single writer of a [`FrictionSlot`].
pub struct FrictionFeed {
    source: Arc<dyn FrictionSource>,
    slot: FrictionSlot,
    interval: Duration,
}

impl FrictionFeed {
    #[must_use]
    pub fn new(source: Arc<dyn FrictionSource>, slot: FrictionSlot, interval: Duration) -> Self {
        Self {
            source,
            slot,
            interval,
        }
    }

    #[must_use]
    pub fn slot(&self) -> FrictionSlot {
        self.slot.clone()
    }

    /// Fetch both inputs and publish them. On failure the slot is untouched.
    pub async fn refresh_once(&self) -> Result<FrictionState> {
        let (gas, usd) = tokio::join!(self.source.gas_price_gwei(), self.source.native_usd());
        let state = FrictionState {
            gas_price_gwei: gas?,
            native_to_usd_rate: usd?,
            last_refreshed: Some(Utc::now()),
        };
        self.slot.publish(state);
        debug!(
            gas_price_gwei = %state.gas_price_gwei,
            native_usd = %state.native_to_usd_rate,
            "Friction refreshed"
        );
        Ok(state)
    }

    /// Refresh immediately, then every interval, until shutdown.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!(interval_secs = self.interval.as_secs(), "Friction feed started");

        loop {
            tokio::select! {
                result = shutdown.changed() => {
                    if result.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.refresh_once().await {
                        let current = self.slot.read();
                        warn!(
                            error = %e,
                            last_refreshed = ?current.last_refreshed,
                            "Friction refresh failed, keeping previous value"
                        );
                    }
                }
            }
        }
        info!("Friction feed stopped");
    }
}
