//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │      Application        │
//!     ┌──────────────┤  Domain + Port          ├──────────────┐
//!     │              └─────────────────────────┘              │
//!     ▼                         ▼                             ▼
//! ┌─────────┐            ┌─────────────┐              ┌───────────┐
//! │ Listing │            │   Stream    │              │ Friction  │
//! │ Adapter │            │   Adapter   │              │  Adapter  │
//! └─────────┘            └─────────────┘              └───────────┘
//! ```
//!
//! - [`MarketFetcher`] - Paginated market listing
//! - [`MarketDataStream`], [`FrameDecoder`] - Streaming feed transport and wire format
//! - [`FrictionSource`] - Gas price and native/USD rate

pub mod outbound;

pub use outbound::exchange::{
    FeedEvent, FrameDecoder, MarketDataStream, MarketFetcher, MarketPage, StreamMessage,
};
pub use outbound::friction::FrictionSource;
