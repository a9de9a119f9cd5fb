//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::path::PathBuf;

/// Default location of the durable store file.
pub const DEFAULT_DB_PATH: &str = "/tmp/hybrid_kv/keyvalue.db";

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path of the SQLite database file; its directory is created if missing
    pub db_path: PathBuf,
    /// HTTP server port
    pub server_port: u16,
    /// Expiry sweep interval in seconds, 0 = no background sweep
    pub sweep_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `KV_DB_PATH` - Database file (default: /tmp/hybrid_kv/keyvalue.db)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `SWEEP_INTERVAL` - Expiry sweep frequency in seconds (default: 60, 0 disables)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            db_path: env::var("KV_DB_PATH")
                .ok()
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.db_path),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.server_port),
            sweep_interval: env::var("SWEEP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.sweep_interval),
        }
    }

    /// Returns true when the background expiry sweep should run.
    pub fn sweep_enabled(&self) -> bool {
        self.sweep_interval > 0
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            server_port: 3000,
            sweep_interval: 60,
        }
    }
}
