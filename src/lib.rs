//! Hybrid KV - A key-value store with an in-memory index over SQLite
//!
//! Values are any JSON-compatible value except a top-level `null`, stored
//! with full type fidelity. Entries may carry a TTL and expire lazily on read.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod storage;
pub mod tasks;
pub mod value;

pub use api::AppState;
pub use cache::KvStore;
pub use config::Config;
pub use error::{KvError, Result};
pub use storage::{DurableStore, SqliteStore};
pub use tasks::spawn_sweep_task;
pub use value::Value;
