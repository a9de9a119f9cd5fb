//! Storage Module
//!
//! Durable backing store for the engine. The store is the source of truth;
//! the in-memory cache only mirrors what it has committed.

mod sqlite;

pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::value::DecodeError;

// == Stored Row ==
/// One row of the durable table, with the value in encoded form.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRow {
    pub key: String,
    /// Encoded value text (see [`crate::value::codec`])
    pub value: String,
    /// Seconds since the Unix epoch
    pub created_at: f64,
    /// Seconds since the Unix epoch, None = never expires
    pub expires_at: Option<f64>,
}

// == Loaded Row ==
/// One row read back by a full scan.
///
/// The value is kept as a per-row result: bytes that are not readable text
/// belong to that key alone and must not fail the scan.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedRow {
    pub key: String,
    pub value: std::result::Result<String, DecodeError>,
    pub created_at: f64,
    pub expires_at: Option<f64>,
}

// == Durable Store Trait ==
/// Transactional, crash-durable table keyed by string key.
///
/// Every method is all-or-nothing: after a failed write no partial row is
/// visible. Failures surface as [`crate::error::KvError::Storage`].
pub trait DurableStore: Send {
    /// Creates the containing directory and the schema if absent. Idempotent.
    fn initialize(&mut self) -> Result<()>;

    /// Inserts the row, replacing any existing row for the same key.
    fn upsert(&mut self, row: &StoredRow) -> Result<()>;

    /// Removes the row for `key`, returning whether one existed.
    fn delete(&mut self, key: &str) -> Result<bool>;

    /// Removes every row, returning how many were removed.
    fn delete_all(&mut self) -> Result<usize>;

    /// Full scan of the table.
    ///
    /// Rows whose key or timestamps cannot be read are logged and skipped.
    fn load_all(&mut self) -> Result<Vec<LoadedRow>>;

    /// Removes rows whose `expires_at` is set and `<= now`.
    fn purge_expired(&mut self, now: f64) -> Result<usize>;

    /// Flushes and releases the underlying handle. Later calls fail.
    fn close(&mut self) -> Result<()>;
}
