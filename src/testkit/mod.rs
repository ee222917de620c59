//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`stream`] - Scripted [`MarketDataStream`](crate::port::MarketDataStream)
//!   and a frame-recording handler.
//! - [`fetcher`] - Paged [`MarketFetcher`](crate::port::MarketFetcher) fake.
//! - [`friction`] - Fixed or failing [`FrictionSource`](crate::port::FrictionSource).
//! - [`domain`] - Builders for domain primitives: tokens, markets, books, frames.
//! - [`config`] - Canonical test configurations.

pub mod config;
pub mod domain;
pub mod fetcher;
pub mod friction;
pub mod stream;
