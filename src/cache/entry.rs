//! Cache Entry Module
//!
//! Defines the in-memory mirror of one durable row.

use serde::Serialize;

use crate::cache::expiry;
use crate::value::Value;

// == Payload ==
/// Value held by a cache entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Decoded(Value),
    /// Durable row whose value text failed to decode; holds the reason
    Corrupt(String),
}

// == Cache Entry ==
/// Represents a single cached entry with its timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub payload: Payload,
    /// Creation timestamp (Unix seconds, fractional)
    pub created_at: f64,
    /// Expiration timestamp (Unix seconds, fractional), None = no expiration
    pub expires_at: Option<f64>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates an entry written at `now` with an optional TTL in seconds.
    pub fn new(value: Value, now: f64, ttl_seconds: Option<f64>) -> Self {
        Self {
            payload: Payload::Decoded(value),
            created_at: now,
            expires_at: expiry::expires_at(now, ttl_seconds),
        }
    }

    // == Is Expired ==
    /// Checks whether the entry is logically absent at `now`.
    pub fn is_expired_at(&self, now: f64) -> bool {
        expiry::is_expired(self.expires_at, now)
    }

    /// Returns the decoded value, or None if the stored text was corrupt.
    pub fn value(&self) -> Option<&Value> {
        match &self.payload {
            Payload::Decoded(value) => Some(value),
            Payload::Corrupt(_) => None,
        }
    }

    /// Builds the externally visible snapshot, or None for a corrupt entry.
    pub fn snapshot(&self) -> Option<EntrySnapshot> {
        self.value().map(|value| EntrySnapshot {
            value: value.clone(),
            created_at: self.created_at,
            expires_at: self.expires_at,
        })
    }
}

// == Entry Snapshot ==
/// What readers see of a live entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntrySnapshot {
    pub value: Value,
    pub created_at: f64,
    pub expires_at: Option<f64>,
}
