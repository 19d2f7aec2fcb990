//! Embedded document store and its connection handle.
//!
//! `DocumentStore::connect` validates the target and issues a [`StoreHandle`]:
//! the single owned handle through which every collection operation flows.
//! The handle owns the store's background expiry sweeper, which removes
//! documents the moment their `expire_at` passes (zero-offset trigger) for
//! every collection that registered an expiring index. The sweeper is aborted
//! deterministically when the handle is shut down or dropped, even with
//! collections still registered.

use crate::config::DriverConfig;
use crate::error::{Error, Result};
use crate::store::collection::Collection;
use chrono::Utc;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::debug;

/// The embedded document store backing the reference driver.
pub struct DocumentStore;

impl DocumentStore {
    /// Opens a store connection for the configured target.
    ///
    /// Fails with [`Error::Connection`] on a malformed (empty) target. Must
    /// be called from within a tokio runtime: the returned handle spawns the
    /// expiry sweeper on it.
    pub fn connect(config: &DriverConfig) -> Result<StoreHandle> {
        if config.address.trim().is_empty() {
            return Err(Error::Connection(
                "empty connection target".to_string(),
            ));
        }

        let collections: Arc<DashMap<String, Arc<Collection>>> = Arc::new(DashMap::new());
        let sweeper = spawn_sweeper(Arc::clone(&collections), config.sweep_interval());
        debug!(address = %config.address, "document store connected");

        Ok(StoreHandle {
            collections,
            sweeper,
        })
    }
}

/// A live connection to the document store.
///
/// Owned by exactly one connection manager; collection handles issued from it
/// are invalid once the handle is shut down.
pub struct StoreHandle {
    collections: Arc<DashMap<String, Arc<Collection>>>,
    sweeper: JoinHandle<()>,
}

impl StoreHandle {
    /// Resolves a collection by name, creating it on first use.
    pub fn collection(&self, name: &str) -> Arc<Collection> {
        self.collections
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Collection::new(name)))
            .clone()
    }

    /// Registers an expiring index on `expire_at` for the named collection,
    /// creating the collection if absent. Fails if the store's sweeper is no
    /// longer running, since the index would never trigger.
    pub fn ensure_expiring_index(&self, name: &str) -> Result<()> {
        if self.sweeper.is_finished() {
            return Err(Error::Query(
                "expiry sweeper is not running".to_string(),
            ));
        }
        self.collection(name).register_expiring_index();
        Ok(())
    }

    /// Names of every collection created on this connection.
    pub fn collection_names(&self) -> Vec<String> {
        self.collections
            .iter()
            .map(|entry| entry.key().clone())
            .collect()
    }

    /// Stops the expiry sweeper and releases the connection.
    pub fn shutdown(&self) {
        self.sweeper.abort();
        debug!("document store handle shut down");
    }
}

impl Drop for StoreHandle {
    fn drop(&mut self) {
        self.sweeper.abort();
    }
}

fn spawn_sweeper(
    collections: Arc<DashMap<String, Arc<Collection>>>,
    interval: std::time::Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // first tick fires immediately; skip it so freshly written documents
        // get a full interval before the first sweep
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let now = Utc::now();
            for entry in collections.iter() {
                if !entry.value().has_expiring_index() {
                    continue;
                }
                let removed = entry.value().sweep_expired(now);
                if removed > 0 {
                    debug!(collection = %entry.value().name(), removed, "swept expired documents");
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;
    use serde_json::json;
    use std::time::Duration;

    fn test_config() -> DriverConfig {
        DriverConfig::new("local://store-tests").option(crate::config::SWEEP_INTERVAL_MS, "20")
    }

    #[tokio::test]
    async fn rejects_empty_target() {
        let result = DocumentStore::connect(&DriverConfig::new("   "));
        assert!(matches!(result, Err(Error::Connection(_))));
    }

    #[tokio::test]
    async fn collection_handles_are_memoized() {
        let handle = DocumentStore::connect(&test_config()).unwrap();
        let a = handle.collection("kv");
        let b = handle.collection("kv");
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(handle.collection_names(), vec!["kv".to_string()]);
        handle.shutdown();
    }

    #[tokio::test]
    async fn sweeper_removes_expired_documents() {
        let handle = DocumentStore::connect(&test_config()).unwrap();
        handle.ensure_expiring_index("kv").unwrap();

        let coll = handle.collection("kv");
        coll.upsert("gone", json!(1), Some(Utc::now() - ChronoDuration::seconds(1)))
            .unwrap();
        coll.upsert("live", json!(2), None).unwrap();

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert_eq!(coll.len(), 1);
        assert_eq!(coll.find_by_id("live").unwrap(), Some(json!(2)));
        handle.shutdown();
    }

    #[tokio::test]
    async fn index_registration_fails_after_shutdown() {
        let handle = DocumentStore::connect(&test_config()).unwrap();
        handle.shutdown();
        // give the abort a moment to land
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(matches!(
            handle.ensure_expiring_index("kv"),
            Err(Error::Query(_))
        ));
    }
}
