//! Exchange-agnostic domain logic.

pub mod book;
pub mod friction;
pub mod id;
pub mod inference;
pub mod market;
pub mod money;
pub mod record;

pub use book::{Outcome, PriceLevel, TokenBook};
pub use friction::FrictionState;
pub use id::{MarketId, TokenId};
pub use inference::{evaluate, weighted_average_price, Fill, Friction, Verdict};
pub use market::{Market, MIN_VOLUME_THRESHOLD};
pub use money::{Price, Usd, Volume};
pub use record::{EventRecord, OpportunityRecord};
