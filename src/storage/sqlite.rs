//! SQLite Durable Store
//!
//! Single-table SQLite backend. Every write runs in its own transaction with
//! `synchronous = FULL`, so a committed row survives a crash and a failed
//! write leaves nothing behind.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, Row};
use tracing::{debug, info, warn};

use crate::error::{KvError, Result};
use crate::storage::{DurableStore, LoadedRow, StoredRow};
use crate::value::DecodeError;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS key_value_store (
        key        TEXT PRIMARY KEY,
        value      TEXT NOT NULL,
        created_at REAL NOT NULL,
        expires_at REAL
    );
    CREATE INDEX IF NOT EXISTS idx_key_value_store_expires_at
        ON key_value_store (expires_at)
        WHERE expires_at IS NOT NULL;
";

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

// == SQLite Store ==
/// [`DurableStore`] backed by a SQLite database file.
///
/// The connection is opened by [`DurableStore::initialize`] and released by
/// [`DurableStore::close`].
#[derive(Debug)]
pub struct SqliteStore {
    /// Database file, None = private in-memory database
    path: Option<PathBuf>,
    conn: Option<Connection>,
}

impl SqliteStore {
    // == Constructors ==
    /// Creates a store for the database file at `path`. Nothing is opened yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            conn: None,
        }
    }

    /// Creates a store backed by a private in-memory database.
    ///
    /// Contents vanish on close; intended for tests.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            conn: None,
        }
    }

    /// Path of the database file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn conn(&mut self) -> Result<&mut Connection> {
        self.conn
            .as_mut()
            .ok_or_else(|| KvError::Storage("database is not open".to_string()))
    }

    fn open_connection(&self) -> Result<Connection> {
        let conn = match &self.path {
            Some(path) => {
                if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                    fs::create_dir_all(dir)?;
                }
                Connection::open(path)?
            }
            None => Connection::open_in_memory()?,
        };

        conn.busy_timeout(BUSY_TIMEOUT)?;
        // In-memory databases answer "memory" here; either mode is fine.
        let mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        conn.pragma_update(None, "synchronous", "FULL")?;
        debug!("SQLite journal mode: {}", mode);

        Ok(conn)
    }
}

impl DurableStore for SqliteStore {
    fn initialize(&mut self) -> Result<()> {
        if self.conn.is_none() {
            let conn = self.open_connection()?;
            self.conn = Some(conn);
            match &self.path {
                Some(path) => info!("Opened durable store at {}", path.display()),
                None => info!("Opened in-memory durable store"),
            }
        }

        self.conn()?.execute_batch(SCHEMA)?;
        Ok(())
    }

    fn upsert(&mut self, row: &StoredRow) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO key_value_store (key, value, created_at, expires_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                created_at = excluded.created_at,
                expires_at = excluded.expires_at",
            params![row.key, row.value, row.created_at, row.expires_at],
        )?;
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<bool> {
        let conn = self.conn()?;
        let removed = conn.execute("DELETE FROM key_value_store WHERE key = ?1", params![key])?;
        Ok(removed > 0)
    }

    fn delete_all(&mut self) -> Result<usize> {
        let conn = self.conn()?;
        let tx = conn.transaction()?;
        let removed = tx.execute("DELETE FROM key_value_store", [])?;
        tx.commit()?;
        Ok(removed)
    }

    fn load_all(&mut self) -> Result<Vec<LoadedRow>> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("SELECT key, value, created_at, expires_at FROM key_value_store")?;
        let mut rows = stmt.query([])?;

        let mut loaded = Vec::new();
        while let Some(row) = rows.next()? {
            match read_row(row) {
                Ok(row) => loaded.push(row),
                Err(e) => warn!("Skipping unreadable row in durable store: {}", e),
            }
        }
        Ok(loaded)
    }

    fn purge_expired(&mut self, now: f64) -> Result<usize> {
        let conn = self.conn()?;
        let tx = conn.transaction()?;
        let removed = tx.execute(
            "DELETE FROM key_value_store WHERE expires_at IS NOT NULL AND expires_at <= ?1",
            params![now],
        )?;
        tx.commit()?;
        Ok(removed)
    }

    fn close(&mut self) -> Result<()> {
        if let Some(conn) = self.conn.take() {
            conn.close().map_err(|(_, e)| KvError::from(e))?;
            debug!("Durable store closed");
        }
        Ok(())
    }
}

/// Reads one scanned row. The value column is checked separately so a bad
/// value only marks its own row as corrupt.
fn read_row(row: &Row<'_>) -> rusqlite::Result<LoadedRow> {
    let value = match row.get_ref(1)? {
        ValueRef::Text(bytes) => std::str::from_utf8(bytes)
            .map(str::to_string)
            .map_err(|e| DecodeError::new(format!("stored value is not valid UTF-8: {}", e))),
        other => Err(DecodeError::new(format!(
            "stored value has SQLite type {}, expected TEXT",
            other.data_type()
        ))),
    };

    Ok(LoadedRow {
        key: row.get(0)?,
        value,
        created_at: row.get(2)?,
        expires_at: row.get(3)?,
    })
}
