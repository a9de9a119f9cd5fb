//! API Handlers
//!
//! HTTP request handlers for each server endpoint. Store calls block on
//! SQLite, so they run on the blocking pool.

use std::sync::Arc;

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde_json::Value as JsonValue;

use crate::api::commands;
use crate::cache::KvStore;
use crate::config::Config;
use crate::error::{KvError, Result};
use crate::models::{Command, CommandResponse, HealthResponse, ReadingsResponse, StatsResponse};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Thread-safe store facade
    pub store: Arc<KvStore>,
}

impl AppState {
    /// Creates a new AppState around an initialized store.
    pub fn new(store: KvStore) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    /// Opens and hydrates the store described by the Config.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(KvStore::open(config)?))
    }
}

/// Runs a store operation on the blocking pool.
async fn run_blocking<T, F>(store: Arc<KvStore>, op: F) -> Result<T>
where
    F: FnOnce(&KvStore) -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(move || op(store.as_ref()))
        .await
        .map_err(|e| KvError::Storage(format!("store task failed: {}", e)))?
}

/// Handler for POST /command
///
/// Parses the command envelope and executes it.
pub async fn command_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<JsonValue>, JsonRejection>,
) -> Result<Json<CommandResponse>> {
    let Json(envelope) = payload.map_err(|e| KvError::Validation(e.body_text()))?;
    let command = Command::from_envelope(envelope)?;

    let response = run_blocking(state.store, move |store| commands::execute(store, command)).await?;
    Ok(Json(response))
}

/// Handler for GET /readings
///
/// Returns every live entry, purging expired ones on the way.
pub async fn readings_handler(State(state): State<AppState>) -> Result<Json<ReadingsResponse>> {
    let readings = run_blocking(state.store, |store| store.list_all()).await?;
    Ok(Json(ReadingsResponse::from(readings)))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Result<Json<StatsResponse>> {
    let stats = run_blocking(state.store, |store| Ok(store.stats())).await?;
    Ok(Json(StatsResponse::from(stats)))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
