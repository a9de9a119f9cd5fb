//! Response DTOs for the command envelope and HTTP endpoints
//!
//! Every command response carries `success: true`; failures are rendered by
//! [`crate::error::KvError`] as `{"success": false, "error": ...}`.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::cache::{CacheStats, EntrySnapshot};
use crate::value::Value;

/// Response body of `set`
#[derive(Debug, Clone, Serialize)]
pub struct SetResponse {
    pub success: bool,
    pub key: String,
    pub value: Value,
}

impl SetResponse {
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self {
            success: true,
            key: key.into(),
            value,
        }
    }
}

/// Response body of `get`
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    pub success: bool,
    pub key: String,
    pub value: Value,
    pub created_at: f64,
    /// Serialized as `null` when the entry never expires
    pub expires_at: Option<f64>,
}

impl GetResponse {
    pub fn new(key: impl Into<String>, entry: EntrySnapshot) -> Self {
        Self {
            success: true,
            key: key.into(),
            value: entry.value,
            created_at: entry.created_at,
            expires_at: entry.expires_at,
        }
    }
}

/// Response body of `delete`
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub key: String,
    /// False when the key was absent or already expired
    pub deleted: bool,
}

impl DeleteResponse {
    pub fn new(key: impl Into<String>, deleted: bool) -> Self {
        Self {
            success: true,
            key: key.into(),
            deleted,
        }
    }
}

/// Response body of `delete_all`
#[derive(Debug, Clone, Serialize)]
pub struct DeleteAllResponse {
    pub success: bool,
    pub deleted_count: usize,
}

impl DeleteAllResponse {
    pub fn new(deleted_count: usize) -> Self {
        Self {
            success: true,
            deleted_count,
        }
    }
}

/// Response of any command, serialized as the inner body.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum CommandResponse {
    Set(SetResponse),
    Get(GetResponse),
    Delete(DeleteResponse),
    DeleteAll(DeleteAllResponse),
}

/// Response body for the readings endpoint (GET /readings)
#[derive(Debug, Clone, Serialize)]
pub struct ReadingsResponse {
    /// Every live key mapped to `{value, created_at, expires_at}`
    pub data: BTreeMap<String, EntrySnapshot>,
}

impl From<BTreeMap<String, EntrySnapshot>> for ReadingsResponse {
    fn from(data: BTreeMap<String, EntrySnapshot>) -> Self {
        Self { data }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub hits: u64,
    pub misses: u64,
    /// Entries physically removed after expiring
    pub expired: u64,
    pub total_entries: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            hits: stats.hits,
            misses: stats.misses,
            expired: stats.expired,
            total_entries: stats.total_entries,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
