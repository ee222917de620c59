//! Infrastructure configuration modules.

pub mod logging;
pub mod pipeline;
pub mod session;
pub mod settings;

pub use settings::{Config, Credentials};
