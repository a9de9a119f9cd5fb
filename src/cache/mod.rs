//! Cache Module
//!
//! In-memory index over the durable store, with lazy TTL expiration.

mod entry;
pub mod expiry;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::{CacheEntry, EntrySnapshot, Payload};
pub use expiry::{Clock, ManualClock, SystemClock};
pub use stats::CacheStats;
pub use store::KvStore;
