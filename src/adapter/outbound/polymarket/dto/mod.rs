//! Polymarket data transfer objects.
//!
//! Contains types for API and WebSocket communication:
//! - WebSocket messages (subscriptions, book events)
//! - REST API responses (market listing pages)

pub mod message;
pub mod response;
