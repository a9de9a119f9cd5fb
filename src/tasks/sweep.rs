//! Expiry Sweep Task
//!
//! Background task that periodically purges expired entries. Reads already
//! hide expired entries on their own; the sweep only bounds the growth of
//! keys that are written once and never read again.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::KvStore;

/// Spawns a background task that calls [`KvStore::purge_expired`] every
/// `interval_secs` seconds.
///
/// The purge itself blocks on SQLite, so each run is moved to the blocking
/// pool. Returns a JoinHandle that can be aborted during graceful shutdown.
///
/// # Example
/// ```ignore
/// let store = Arc::new(KvStore::open(&config)?);
/// let sweep_handle = spawn_sweep_task(store.clone(), 60);
/// // Later, during shutdown:
/// sweep_handle.abort();
/// ```
pub fn spawn_sweep_task(store: Arc<KvStore>, interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting expiry sweep task with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            let store = store.clone();
            let result = tokio::task::spawn_blocking(move || store.purge_expired()).await;

            match result {
                Ok(Ok(removed)) if removed > 0 => {
                    info!("Expiry sweep: removed {} expired entries", removed)
                }
                Ok(Ok(_)) => debug!("Expiry sweep: no expired entries found"),
                Ok(Err(e)) => warn!("Expiry sweep failed: {}", e),
                Err(e) => warn!("Expiry sweep task panicked: {}", e),
            }
        }
    })
}
