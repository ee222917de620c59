//! Application services (use cases).
//!
//! These services orchestrate domain logic and coordinate adapters
//! through the ports:
//!
//! - [`discovery`] - Paginated market listing into a tradable universe
//! - [`cache`] - Shared per-token book store
//! - [`dispatch`] - Receive-path routing of decoded frames
//! - [`inference`] - Arbitrage evaluation worker
//! - [`friction`] - Periodic gas and price refresh
//! - [`journal`] - Append-only analytics logs

pub mod cache;
pub mod debounce;
pub mod discovery;
pub mod dispatch;
pub mod friction;
pub mod inference;
pub mod journal;

pub use cache::book::{BookStore, Refresh};
pub use debounce::Debouncer;
pub use discovery::{Discovered, Discovery, DiscoverySettings, SnapshotCache};
pub use dispatch::{DispatchStats, EventDispatcher, FrameHandler};
pub use friction::{FrictionFeed, FrictionSlot};
pub use inference::{Assessment, InferenceJob, InferenceSettings, InferenceStats, InferenceWorker};
pub use journal::{journal, JournalHandle, JournalWriter, OpenJournal};
