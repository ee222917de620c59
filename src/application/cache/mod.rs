//! Runtime caches used by application services.

pub mod book;
