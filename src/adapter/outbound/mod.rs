//! Outbound adapters (driven side).

pub mod friction;
pub mod polymarket;
