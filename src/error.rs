//! Error types for the key-value engine
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == KV Error Enum ==
/// Unified error type for the engine and its HTTP surface.
///
/// Every variant is recoverable at the operation boundary; none of them
/// leaves the store unusable for other keys.
#[derive(Error, Debug)]
pub enum KvError {
    /// Caller supplied a missing or unsupported key, value or TTL
    #[error("Invalid request: {0}")]
    Validation(String),

    /// Key is absent or logically expired
    #[error("Key '{0}' not found")]
    NotFound(String),

    /// Durable store I/O or transaction failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Stored representation of a key could not be decoded
    #[error("Corrupted value for key '{key}': {reason}")]
    Corruption { key: String, reason: String },
}

impl From<rusqlite::Error> for KvError {
    fn from(err: rusqlite::Error) -> Self {
        KvError::Storage(err.to_string())
    }
}

impl From<std::io::Error> for KvError {
    fn from(err: std::io::Error) -> Self {
        KvError::Storage(err.to_string())
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for KvError {
    fn into_response(self) -> Response {
        let status = match &self {
            KvError::Validation(_) => StatusCode::BAD_REQUEST,
            KvError::NotFound(_) => StatusCode::NOT_FOUND,
            KvError::Storage(_) | KvError::Corruption { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "success": false,
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the engine.
pub type Result<T> = std::result::Result<T, KvError>;
