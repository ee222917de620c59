//! Polymarket market-channel frame decoding.

use serde_json::Value;
use tracing::{trace, warn};

use super::dto::message::PolymarketBookMessage;
use crate::domain::id::TokenId;
use crate::error::{Error, Result};
use crate::port::outbound::exchange::{FeedEvent, FrameDecoder};

/// Decoder for Polymarket market-channel frames.
///
/// A frame is one event object or an array of them. Each element is decoded
/// on its own: a malformed element is logged and dropped while the rest of
/// the frame is still delivered.
#[derive(Debug, Default, Clone, Copy)]
pub struct PolymarketFrameDecoder;

impl PolymarketFrameDecoder {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn decode_event(item: Value) -> Option<FeedEvent> {
        let kind = item
            .get("event_type")
            .and_then(Value::as_str)
            .map(str::to_owned);

        let is_book = match kind.as_deref() {
            Some("book") => true,
            // Untyped objects carrying depth are book snapshots.
            None => item.get("bids").is_some() || item.get("asks").is_some(),
            Some(_) => false,
        };

        if !is_book {
            return Some(FeedEvent::Other {
                kind: kind.unwrap_or_else(|| "unknown".into()),
            });
        }

        match serde_json::from_value::<PolymarketBookMessage>(item) {
            Ok(book) => Some(FeedEvent::BookUpdate {
                bids: book.bid_levels(),
                asks: book.ask_levels(),
                asset_id: TokenId::from(book.asset_id),
            }),
            Err(e) => {
                warn!(error = %e, "Dropping malformed book event");
                None
            }
        }
    }
}

impl FrameDecoder for PolymarketFrameDecoder {
    fn decode(&self, raw: &str) -> Result<Vec<FeedEvent>> {
        let value: Value = serde_json::from_str(raw)?;
        let items = match value {
            Value::Array(items) => items,
            object @ Value::Object(_) => vec![object],
            other => {
                return Err(Error::Parse(format!(
                    "expected object or array frame, got {other}"
                )))
            }
        };

        trace!(events = items.len(), "Decoding frame");
        Ok(items.into_iter().filter_map(Self::decode_event).collect())
    }
}
