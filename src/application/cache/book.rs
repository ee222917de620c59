//! Thread-safe per-token book store.
//!
//! The store owns one [`TokenBook`] per discovered token. Pairs are always
//! inserted together, so every book's `other_side` is itself a key in the
//! store. Feed refreshes replace a book's levels in place; books are never
//! removed during a session.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::domain::{
    book::{Outcome, PriceLevel, TokenBook},
    id::{MarketId, TokenId},
    record::EventRecord,
};

/// What a successful refresh touched.
#[derive(Debug, Clone)]
pub struct Refresh {
    /// Market the refreshed token belongs to; used as the debounce key.
    pub market_id: MarketId,
    /// Top-of-book record for the analytics log.
    pub event: EventRecord,
}

/// Thread-safe store of token books keyed by asset id.
#[derive(Default)]
pub struct BookStore {
    books: RwLock<HashMap<TokenId, TokenBook>>,
}

impl BookStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole store with `books`.
    ///
    /// Books whose `other_side` is missing from `books` are dropped so the
    /// paired-existence invariant holds. Returns the number of books kept.
    pub fn replace_all(&self, mut books: HashMap<TokenId, TokenBook>) -> usize {
        let orphans: Vec<TokenId> = books
            .values()
            .filter(|b| !books.contains_key(b.other_side()))
            .map(|b| b.asset_id().clone())
            .collect();

        for id in &orphans {
            warn!(asset_id = %id, "Dropping book without its paired side");
            books.remove(id);
        }

        let kept = books.len();
        *self.books.write() = books;
        kept
    }

    /// Insert both sides of a market under one write lock.
    pub fn insert_pair(&self, yes: TokenBook, no: TokenBook) {
        let mut books = self.books.write();
        books.insert(yes.asset_id().clone(), yes);
        books.insert(no.asset_id().clone(), no);
    }

    /// Replace the levels of `asset_id`, returning whether the asset is known.
    pub fn apply_update(&self, asset_id: &TokenId, bids: Vec<PriceLevel>, asks: Vec<PriceLevel>) -> bool {
        self.apply_update_at(asset_id, bids, asks, Utc::now()).is_some()
    }

    /// Replace the levels of `asset_id` stamped with `at`.
    ///
    /// Unknown ids are logged at debug level and yield `None`.
    pub fn apply_update_at(
        &self,
        asset_id: &TokenId,
        bids: Vec<PriceLevel>,
        asks: Vec<PriceLevel>,
        at: DateTime<Utc>,
    ) -> Option<Refresh> {
        let mut books = self.books.write();
        let Some(book) = books.get_mut(asset_id) else {
            debug!(asset_id = %asset_id, "Update for unknown asset ignored");
            return None;
        };

        book.replace_levels(bids, asks, at);
        Some(Refresh {
            market_id: book.market_id().clone(),
            event: EventRecord::from_book(book, at),
        })
    }

    /// Get a snapshot of a book.
    #[must_use]
    pub fn get(&self, token_id: &TokenId) -> Option<TokenBook> {
        self.books.read().get(token_id).cloned()
    }

    /// Get snapshots of two books atomically.
    #[must_use]
    pub fn get_pair(
        &self,
        token_a: &TokenId,
        token_b: &TokenId,
    ) -> (Option<TokenBook>, Option<TokenBook>) {
        let books = self.books.read();
        (books.get(token_a).cloned(), books.get(token_b).cloned())
    }

    /// Both books of the market `asset_id` belongs to, YES first.
    #[must_use]
    pub fn market_pair(&self, asset_id: &TokenId) -> Option<(TokenBook, TokenBook)> {
        let books = self.books.read();
        let book = books.get(asset_id)?;
        let other = books.get(book.other_side())?;
        match book.outcome() {
            Outcome::Yes => Some((book.clone(), other.clone())),
            Outcome::No => Some((other.clone(), book.clone())),
        }
    }

    /// Time since the book was last refreshed; `None` if unknown or never refreshed.
    #[must_use]
    pub fn age(&self, token_id: &TokenId, now: DateTime<Utc>) -> Option<chrono::Duration> {
        let updated = self.books.read().get(token_id)?.last_update_ts()?;
        Some(now - updated)
    }

    /// All known asset ids, ordered.
    #[must_use]
    pub fn token_ids(&self) -> BTreeSet<TokenId> {
        self.books.read().keys().cloned().collect()
    }

    /// Empty-sided copies of every book.
    #[must_use]
    pub fn skeletons(&self) -> HashMap<TokenId, TokenBook> {
        self.books
            .read()
            .iter()
            .map(|(id, book)| (id.clone(), book.to_skeleton()))
            .collect()
    }

    /// Number of books in the store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.books.read().len()
    }

    /// Returns true if the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
