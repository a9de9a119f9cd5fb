//! Store Facade
//!
//! `KvStore` combines the in-memory cache with the durable store. Writes go
//! to the durable store first and reach the cache only after they commit;
//! reads are served from the cache and apply the expiration policy lazily.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};
use serde_json::Value as JsonValue;
use tracing::{debug, info, warn};

use crate::cache::entry::{CacheEntry, EntrySnapshot, Payload};
use crate::cache::expiry::{self, Clock, SystemClock};
use crate::cache::CacheStats;
use crate::config::Config;
use crate::error::{KvError, Result};
use crate::storage::{DurableStore, SqliteStore, StoredRow};
use crate::value::{codec, Value};

// == Inner State ==
/// Everything guarded by the store lock. The cache and the durable handle
/// live under the same lock so a write and its cache update are one step.
struct Inner {
    entries: HashMap<String, CacheEntry>,
    durable: Box<dyn DurableStore>,
    stats: CacheStats,
    closed: bool,
}

impl Inner {
    /// Removes one expired key from the cache and, best effort, from disk.
    fn purge_expired_key(&mut self, key: &str) {
        self.entries.remove(key);
        self.stats.record_expired(1);

        // The row is already logically absent; a failed delete only delays
        // its physical removal until the next sweep or hydration.
        if let Err(e) = self.durable.delete(key) {
            warn!("Failed to purge expired key '{}' from durable store: {}", key, e);
        } else {
            debug!("Purged expired key '{}'", key);
        }
    }

    /// Removes every expired entry, batching the durable side into one call.
    fn purge_all_expired(&mut self, now: f64) -> usize {
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        if expired_keys.is_empty() {
            return 0;
        }

        for key in &expired_keys {
            self.entries.remove(key);
        }
        self.stats.record_expired(expired_keys.len());

        if let Err(e) = self.durable.purge_expired(now) {
            warn!("Failed to purge expired rows from durable store: {}", e);
        }

        debug!("Purged {} expired entries", expired_keys.len());
        expired_keys.len()
    }
}

// == KV Store ==
/// The store facade. Safe to share between threads (`Arc<KvStore>`).
///
/// # Lifecycle
/// - [`KvStore::initialize`] hydrates the cache from the durable store and
///   purges rows that already expired. Calling it again re-hydrates.
/// - [`KvStore::shutdown`] closes the durable handle; later operations fail
///   with [`KvError::Storage`] until `initialize` is called again.
pub struct KvStore {
    inner: Mutex<Inner>,
    clock: Arc<dyn Clock>,
}

impl KvStore {
    // == Constructors ==
    /// Creates a store over `durable` using the wall clock.
    ///
    /// The cache starts empty; call [`KvStore::initialize`] before use.
    pub fn new(durable: impl DurableStore + 'static) -> Self {
        Self::with_clock(durable, Arc::new(SystemClock))
    }

    /// Creates a store over `durable` reading time from `clock`.
    pub fn with_clock(durable: impl DurableStore + 'static, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                durable: Box::new(durable),
                stats: CacheStats::new(),
                closed: false,
            }),
            clock,
        }
    }

    /// Opens the SQLite store at the configured path and hydrates from it.
    pub fn open(config: &Config) -> Result<Self> {
        let store = Self::new(SqliteStore::new(&config.db_path));
        store.initialize()?;
        Ok(store)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        let inner = self.inner.lock();
        if inner.closed {
            return Err(KvError::Storage("store is shut down".to_string()));
        }
        Ok(inner)
    }

    // == Initialize ==
    /// Hydrates the cache from the durable store.
    ///
    /// Rows that already expired are left out of the cache and removed from
    /// the durable store with a single purge. Rows whose value cannot be
    /// decoded are kept as corrupt entries so only that key reports an error.
    ///
    /// Returns the number of entries loaded into the cache.
    pub fn initialize(&self) -> Result<usize> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        inner.durable.initialize()?;
        let rows = inner.durable.load_all()?;
        let now = self.clock.now();

        let mut entries = HashMap::with_capacity(rows.len());
        let mut expired = 0;

        for row in rows {
            if expiry::is_expired(row.expires_at, now) {
                expired += 1;
                continue;
            }

            let payload = match row.value.and_then(|text| codec::decode(&text)) {
                Ok(value) => Payload::Decoded(value),
                Err(e) => {
                    warn!("Stored value for key '{}' is corrupt: {}", row.key, e);
                    Payload::Corrupt(e.to_string())
                }
            };

            entries.insert(
                row.key,
                CacheEntry {
                    payload,
                    created_at: row.created_at,
                    expires_at: row.expires_at,
                },
            );
        }

        if expired > 0 {
            if let Err(e) = inner.durable.purge_expired(now) {
                warn!("Failed to purge expired rows during hydration: {}", e);
            }
            inner.stats.record_expired(expired);
        }

        inner.entries = entries;
        inner.closed = false;

        info!(
            "Store hydrated: {} entries loaded, {} expired rows purged",
            inner.entries.len(),
            expired
        );
        Ok(inner.entries.len())
    }

    // == Set ==
    /// Stores `value` under `key`, replacing any previous value and TTL.
    ///
    /// A positive `ttl_seconds` sets an expiration; zero, negative or None
    /// means the entry never expires. The durable write happens first; if it
    /// fails, the cache is left untouched and [`KvError::Storage`] is returned.
    pub fn set(&self, key: &str, value: Value, ttl_seconds: Option<f64>) -> Result<EntrySnapshot> {
        validate_key(key)?;
        validate_ttl(ttl_seconds)?;
        let encoded = codec::encode(&value)?;

        let mut guard = self.lock()?;
        let inner = &mut *guard;

        let now = self.clock.now();
        let expires_at = expiry::expires_at(now, ttl_seconds);
        if !expiry::is_after(expires_at, now) {
            return Err(KvError::Validation(
                "ttl_seconds is too small to take effect".to_string(),
            ));
        }

        let row = StoredRow {
            key: key.to_string(),
            value: encoded,
            created_at: now,
            expires_at,
        };

        inner.durable.upsert(&row)?;

        let snapshot = EntrySnapshot {
            value: value.clone(),
            created_at: row.created_at,
            expires_at: row.expires_at,
        };
        debug!("Set key '{}' ({})", key, value.kind());

        inner
            .entries
            .insert(row.key, CacheEntry::new(value, now, ttl_seconds));
        inner.stats.set_total_entries(inner.entries.len());
        Ok(snapshot)
    }

    /// Validates an untyped JSON value and stores it.
    ///
    /// A top-level `null` fails with [`KvError::Validation`] before any
    /// state is touched.
    pub fn set_json(
        &self,
        key: &str,
        value: JsonValue,
        ttl_seconds: Option<f64>,
    ) -> Result<EntrySnapshot> {
        validate_key(key)?;
        let value = Value::try_from(value)?;
        self.set(key, value, ttl_seconds)
    }

    // == Get ==
    /// Retrieves a live entry.
    ///
    /// An expired entry is purged on sight and reported as
    /// [`KvError::NotFound`].
    pub fn get(&self, key: &str) -> Result<EntrySnapshot> {
        let mut guard = self.lock()?;
        let inner = &mut *guard;
        let now = self.clock.now();

        let expired = match inner.entries.get(key) {
            Some(entry) => entry.is_expired_at(now),
            None => {
                inner.stats.record_miss();
                return Err(KvError::NotFound(key.to_string()));
            }
        };

        if expired {
            inner.purge_expired_key(key);
            inner.stats.record_miss();
            inner.stats.set_total_entries(inner.entries.len());
            return Err(KvError::NotFound(key.to_string()));
        }

        let entry = &inner.entries[key];
        match &entry.payload {
            Payload::Decoded(value) => {
                inner.stats.record_hit();
                Ok(EntrySnapshot {
                    value: value.clone(),
                    created_at: entry.created_at,
                    expires_at: entry.expires_at,
                })
            }
            Payload::Corrupt(reason) => Err(KvError::Corruption {
                key: key.to_string(),
                reason: reason.clone(),
            }),
        }
    }

    // == Delete ==
    /// Removes `key` from the durable store and the cache.
    ///
    /// Returns true if a live entry existed. Deleting an absent or expired
    /// key is not an error and returns false.
    pub fn delete(&self, key: &str) -> Result<bool> {
        validate_key(key)?;

        let mut guard = self.lock()?;
        let inner = &mut *guard;
        let now = self.clock.now();

        inner.durable.delete(key)?;

        let existed = match inner.entries.remove(key) {
            Some(entry) if entry.is_expired_at(now) => {
                inner.stats.record_expired(1);
                false
            }
            Some(_) => true,
            None => false,
        };
        inner.stats.set_total_entries(inner.entries.len());

        debug!("Deleted key '{}' (existed: {})", key, existed);
        Ok(existed)
    }

    // == Delete All ==
    /// Clears the durable store and the cache.
    ///
    /// Returns the number of live entries removed; entries that had already
    /// expired are removed too but not counted.
    pub fn delete_all(&self) -> Result<usize> {
        let mut guard = self.lock()?;
        let inner = &mut *guard;
        let now = self.clock.now();

        let live = inner
            .entries
            .values()
            .filter(|entry| !entry.is_expired_at(now))
            .count();
        let expired = inner.entries.len() - live;

        inner.durable.delete_all()?;

        inner.entries.clear();
        inner.stats.record_expired(expired);
        inner.stats.set_total_entries(0);

        info!("Deleted all entries ({} live)", live);
        Ok(live)
    }

    // == List All ==
    /// Returns every live entry, keyed by key, after purging expired ones.
    ///
    /// Corrupt entries are skipped.
    pub fn list_all(&self) -> Result<BTreeMap<String, EntrySnapshot>> {
        let mut guard = self.lock()?;
        let inner = &mut *guard;
        let now = self.clock.now();

        inner.purge_all_expired(now);
        inner.stats.set_total_entries(inner.entries.len());

        let mut listing = BTreeMap::new();
        for (key, entry) in &inner.entries {
            match entry.snapshot() {
                Some(snapshot) => {
                    listing.insert(key.clone(), snapshot);
                }
                None => warn!("Skipping corrupt entry '{}' in listing", key),
            }
        }
        Ok(listing)
    }

    // == Purge Expired ==
    /// Removes every expired entry from the cache and the durable store.
    ///
    /// Used by the periodic sweep; reads never depend on it having run.
    pub fn purge_expired(&self) -> Result<usize> {
        let mut guard = self.lock()?;
        let inner = &mut *guard;
        let now = self.clock.now();

        let removed = inner.purge_all_expired(now);
        inner.stats.set_total_entries(inner.entries.len());
        Ok(removed)
    }

    // == Shutdown ==
    /// Closes the durable handle and drops the cache. Idempotent.
    pub fn shutdown(&self) -> Result<()> {
        let mut inner = self.inner.lock();
        if inner.closed {
            return Ok(());
        }

        inner.durable.close()?;
        inner.entries.clear();
        inner.closed = true;

        info!("Store shut down");
        Ok(())
    }

    // == Stats ==
    /// Returns current engine counters.
    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        let mut stats = inner.stats.clone();
        stats.set_total_entries(inner.entries.len());
        stats
    }

    // == Length ==
    /// Returns the number of cached entries, including not-yet-purged
    /// expired ones.
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// == Validation ==
fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(KvError::Validation("key cannot be empty".to_string()));
    }
    Ok(())
}

fn validate_ttl(ttl_seconds: Option<f64>) -> Result<()> {
    match ttl_seconds {
        Some(ttl) if !ttl.is_finite() => Err(KvError::Validation(
            "ttl_seconds must be a finite number".to_string(),
        )),
        _ => Ok(()),
    }
}
