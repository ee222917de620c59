//! Market discovery: paginated listing, tradability pruning and snapshot caching.
//!
//! A fresh snapshot short-circuits discovery with zero network calls.
//! Otherwise the listing is paged with a cursor until the API signals the
//! end. Any request failure stops the scan; whatever was collected so far is
//! returned marked incomplete and is never persisted.

pub mod snapshot;

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::domain::{book::TokenBook, id::TokenId, market::Market, market::MIN_VOLUME_THRESHOLD};
use crate::port::outbound::exchange::MarketFetcher;

pub use snapshot::{DiscoverySnapshot, SnapshotCache};

/// Tunables for a discovery scan.
#[derive(Debug, Clone, Copy)]
pub struct DiscoverySettings {
    pub min_volume_24h: Decimal,
    /// Safety cap on pages per scan.
    pub max_pages: usize,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            min_volume_24h: MIN_VOLUME_THRESHOLD,
            max_pages: 1000,
        }
    }
}

/// Result of discovery.
#[derive(Debug, Clone, Default)]
pub struct Discovered {
    pub token_ids: BTreeSet<TokenId>,
    pub books: HashMap<TokenId, TokenBook>,
    /// The listing was read to its end without error.
    pub complete: bool,
    /// Served from the snapshot cache.
    pub from_cache: bool,
    pub pages: usize,
    pub markets_seen: usize,
}

impl Discovered {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.token_ids.is_empty()
    }

    fn insert_market(&mut self, market: &Market) -> bool {
        let Some((yes, no)) = market.book_pair() else {
            return false;
        };
        if self.books.contains_key(yes.asset_id()) || self.books.contains_key(no.asset_id()) {
            debug!(market_id = %market.market_id(), "Token already claimed by another market");
            return false;
        }
        self.token_ids.insert(yes.asset_id().clone());
        self.token_ids.insert(no.asset_id().clone());
        self.books.insert(yes.asset_id().clone(), yes);
        self.books.insert(no.asset_id().clone(), no);
        true
    }

    fn from_snapshot(snapshot: DiscoverySnapshot) -> Self {
        Self {
            token_ids: snapshot.token_ids,
            books: snapshot.books_skeleton.into_iter().collect(),
            complete: true,
            from_cache: true,
            ..Self::default()
        }
    }

    fn to_snapshot(&self, saved_at: DateTime<Utc>) -> DiscoverySnapshot {
        DiscoverySnapshot {
            token_ids: self.token_ids.clone(),
            books_skeleton: self
                .books
                .iter()
                .map(|(id, book)| (id.clone(), book.to_skeleton()))
                .collect(),
            saved_at,
        }
    }
}

/// Discovers the tradable token universe.
pub struct Discovery {
    fetcher: Arc<dyn MarketFetcher>,
    settings: DiscoverySettings,
    cache: Option<SnapshotCache>,
    read_cache: bool,
}

impl Discovery {
    #[must_use]
    pub fn new(fetcher: Arc<dyn MarketFetcher>, settings: DiscoverySettings) -> Self {
        Self {
            fetcher,
            settings,
            cache: None,
            read_cache: true,
        }
    }

    /// Persist complete scans to `cache` and, if `read` is set, serve fresh
    /// snapshots from it.
    #[must_use]
    pub fn with_cache(mut self, cache: SnapshotCache, read: bool) -> Self {
        self.cache = Some(cache);
        self.read_cache = read;
        self
    }

    /// Run discovery now.
    pub async fn discover(&self) -> Discovered {
        self.discover_at(Utc::now()).await
    }

    /// Run discovery as of `now` (used for snapshot freshness and stamping).
    pub async fn discover_at(&self, now: DateTime<Utc>) -> Discovered {
        if let Some(snapshot) = self.cached(now) {
            info!(
                tokens = snapshot.token_ids.len(),
                saved_at = %snapshot.saved_at,
                "Using cached discovery snapshot"
            );
            return Discovered::from_snapshot(snapshot);
        }

        let discovered = self.scan().await;

        if discovered.is_empty() {
            warn!(
                complete = discovered.complete,
                markets_seen = discovered.markets_seen,
                "Discovery found no tradable markets"
            );
        } else if discovered.complete {
            self.persist(&discovered, now);
        }

        discovered
    }

    fn cached(&self, now: DateTime<Utc>) -> Option<DiscoverySnapshot> {
        let cache = self.cache.as_ref().filter(|_| self.read_cache)?;
        match cache.load(now) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(error = %e, path = %cache.path().display(), "Ignoring unreadable discovery snapshot");
                None
            }
        }
    }

    fn persist(&self, discovered: &Discovered, now: DateTime<Utc>) {
        let Some(cache) = &self.cache else {
            return;
        };
        if let Err(e) = cache.save(&discovered.to_snapshot(now)) {
            warn!(error = %e, path = %cache.path().display(), "Failed to save discovery snapshot");
        }
    }

    /// Page through the listing and collect tradable markets.
    pub async fn scan(&self) -> Discovered {
        let mut result = Discovered::default();
        let mut cursor = String::new();
        let mut seen_cursors = HashSet::new();

        loop {
            if result.pages >= self.settings.max_pages {
                warn!(pages = result.pages, "Discovery page limit reached");
                return result;
            }

            let page = match self.fetcher.fetch_page(&cursor).await {
                Ok(page) => page,
                Err(e) => {
                    warn!(
                        error = %e,
                        page = result.pages + 1,
                        exchange = self.fetcher.exchange_name(),
                        "Market listing request failed, stopping discovery"
                    );
                    return result;
                }
            };
            result.pages += 1;

            if page.markets.is_empty() {
                debug!(page = result.pages, "Empty page, listing finished");
                break;
            }

            let mut accepted = 0;
            for market in &page.markets {
                result.markets_seen += 1;
                if market.is_tradable(self.settings.min_volume_24h) && result.insert_market(market) {
                    accepted += 1;
                }
            }
            debug!(
                page = result.pages,
                markets = page.markets.len(),
                accepted,
                "Processed market page"
            );

            match page.next_cursor {
                None => break,
                Some(next) if self.fetcher.is_terminal_cursor(&next) => break,
                Some(next) => {
                    if !seen_cursors.insert(next.clone()) {
                        warn!(cursor = %next, "Listing returned a repeated cursor, stopping");
                        return result;
                    }
                    cursor = next;
                }
            }
        }

        result.complete = true;
        info!(
            pages = result.pages,
            markets = result.markets_seen,
            tokens = result.token_ids.len(),
            "Discovery complete"
        );
        result
    }
}
