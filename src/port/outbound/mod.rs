//! Outbound ports (driven side): interfaces implemented by outbound adapters.
//!
//! These contracts describe the external collaborators: the market listing,
//! the streaming feed and its frame format, and the friction price feeds.

pub mod exchange;
pub mod friction;
