//! Atomic-scanner - real-time single-market arbitrage detection for binary
//! prediction markets.
//!
//! A binary market pays exactly $1 to whichever outcome wins, so buying both
//! sides for less than $1 in total locks in a profit. This crate discovers
//! liquid binary markets, mirrors their order books from the public market
//! channel, and evaluates each refreshed pair for a YES+NO cost below $1 net
//! of gas and fees at a fixed target size. Opportunities and book refreshes
//! are written to append-only JSON-lines journals.
//!
//! # Architecture
//!
//! The crate follows a hexagonal layout:
//!
//! - [`domain`] - Pure types and the inference core (no I/O)
//! - [`port`] - Traits for the listing API, market stream, frame decoding and friction feeds
//! - [`adapter`] - Polymarket REST/WebSocket and HTTP friction implementations
//! - [`application`] - Discovery, book store, dispatch, inference worker, journals
//! - [`infrastructure`] - Configuration, session state machine, composition root
//! - [`cli`] - Command-line interface
//! - [`error`] - Error types for the crate
//!
//! # Features
//!
//! - `testkit` - Expose scripted streams, fakes and builders to integration tests
//!
//! # Example
//!
//! ```
//! use atomic_scanner::domain::{evaluate, Friction, PriceLevel};
//! use rust_decimal_macros::dec;
//!
//! let yes = [PriceLevel::new(dec!(0.40), dec!(1000))];
//! let no = [PriceLevel::new(dec!(0.55), dec!(1000))];
//! let verdict = evaluate(dec!(100), &yes, &no, Friction::default());
//! assert!(verdict.is_arbitrage);
//! assert_eq!(verdict.expected_return_usd, dec!(5));
//! ```

pub mod adapter;
pub mod application;
pub mod cli;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
