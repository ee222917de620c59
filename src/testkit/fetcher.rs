//! Scripted [`MarketFetcher`] for discovery tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::market::Market;
use crate::error::{Error, Result};
use crate::port::outbound::exchange::{MarketFetcher, MarketPage};

/// Terminal cursor recognized by [`FakeFetcher`], mirroring the live API.
pub const END_CURSOR: &str = "LTE=";

/// Serves pre-built pages in order and records the cursors it was asked for.
///
/// Once the script runs out every request fails.
pub struct FakeFetcher {
    pages: Mutex<VecDeque<Result<MarketPage>>>,
    cursors: Mutex<Vec<String>>,
    calls: Arc<AtomicU32>,
}

impl FakeFetcher {
    pub fn new(pages: Vec<Result<MarketPage>>) -> Self {
        Self {
            pages: Mutex::new(pages.into()),
            cursors: Mutex::new(Vec::new()),
            calls: Arc::new(AtomicU32::new(0)),
        }
    }

    /// A page of `markets` pointing at `next`.
    pub fn page(markets: Vec<Market>, next: Option<&str>) -> Result<MarketPage> {
        Ok(MarketPage {
            markets,
            next_cursor: next.map(str::to_owned),
        })
    }

    /// A failed request.
    pub fn failure(message: &str) -> Result<MarketPage> {
        Err(Error::Connection(message.to_owned()))
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Cursors requested, in order.
    pub fn cursors(&self) -> Vec<String> {
        self.cursors.lock().clone()
    }
}

#[async_trait]
impl MarketFetcher for FakeFetcher {
    async fn fetch_page(&self, cursor: &str) -> Result<MarketPage> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.cursors.lock().push(cursor.to_owned());
        self.pages
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(Error::Connection("no more scripted pages".into())))
    }

    fn is_terminal_cursor(&self, cursor: &str) -> bool {
        cursor.is_empty() || cursor == END_CURSOR
    }

    fn exchange_name(&self) -> &'static str {
        "fake"
    }
}
