//! Polymarket exchange integration.

pub mod client;
pub mod decoder;
pub mod dto;
pub mod settings;
pub mod stream;

pub use client::PolymarketClient;
pub use decoder::PolymarketFrameDecoder;
pub use settings::PolymarketConfig;
pub use stream::PolymarketDataStream;
