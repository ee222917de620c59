//! Exchange port for market discovery and streaming market data.
//!
//! These traits are the integration points for the listing API and the
//! public market-data feed. The session and dispatcher depend only on them,
//! so tests drive the whole pipeline with scripted implementations.

use async_trait::async_trait;

use crate::domain::{book::PriceLevel, id::TokenId, market::Market};
use crate::error::Error;

/// One page of the market listing.
#[derive(Debug, Clone, Default)]
pub struct MarketPage {
    pub markets: Vec<Market>,
    /// Cursor for the following page, exactly as returned by the API.
    pub next_cursor: Option<String>,
}

/// Fetches the market listing page by page.
#[async_trait]
pub trait MarketFetcher: Send + Sync {
    /// Fetch the page addressed by `cursor` (empty for the first page).
    async fn fetch_page(&self, cursor: &str) -> Result<MarketPage, Error>;

    /// Whether `cursor` marks the end of the listing.
    fn is_terminal_cursor(&self, cursor: &str) -> bool {
        cursor.is_empty()
    }

    /// Get the exchange name for logging/debugging.
    fn exchange_name(&self) -> &'static str;
}

/// Messages yielded by a market data stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamMessage {
    /// A raw application frame, passed on undecoded.
    Frame(String),
    /// The connection ended; the stream must be reconnected before reuse.
    Disconnected {
        /// Close code from the peer, if one was received.
        code: Option<u16>,
        reason: String,
    },
}

/// Real-time market data stream from an exchange.
///
/// Implementations own the transport and its keepalive; decoding is left to
/// a [`FrameDecoder`] so the receive loop stays transport-agnostic.
#[async_trait]
pub trait MarketDataStream: Send {
    /// Connect to the exchange's real-time data feed.
    async fn connect(&mut self) -> Result<(), Error>;

    /// Send one subscription frame for `token_ids`.
    async fn subscribe(&mut self, token_ids: &[TokenId]) -> Result<(), Error>;

    /// Receive the next message.
    ///
    /// Returns `None` when the stream is not connected.
    async fn next_message(&mut self) -> Option<StreamMessage>;

    /// Close the connection, if open.
    async fn close(&mut self);

    /// Get the exchange name for logging/debugging.
    fn exchange_name(&self) -> &'static str;
}

#[async_trait]
impl MarketDataStream for Box<dyn MarketDataStream> {
    async fn connect(&mut self) -> Result<(), Error> {
        (**self).connect().await
    }

    async fn subscribe(&mut self, token_ids: &[TokenId]) -> Result<(), Error> {
        (**self).subscribe(token_ids).await
    }

    async fn next_message(&mut self) -> Option<StreamMessage> {
        (**self).next_message().await
    }

    async fn close(&mut self) {
        (**self).close().await;
    }

    fn exchange_name(&self) -> &'static str {
        (**self).exchange_name()
    }
}

/// A typed event decoded from a raw frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedEvent {
    /// Full per-level refresh of one asset's book.
    BookUpdate {
        asset_id: TokenId,
        bids: Vec<PriceLevel>,
        asks: Vec<PriceLevel>,
    },
    /// A recognized frame that carries no book data (price change, tick size...).
    Other { kind: String },
}

/// Decodes raw frames into typed events.
///
/// A single frame may batch several events.
pub trait FrameDecoder: Send + Sync {
    /// Decode `raw`. An error means the whole frame is unusable.
    fn decode(&self, raw: &str) -> Result<Vec<FeedEvent>, Error>;
}
