//! Reference driver over the embedded document store.
//!
//! Binds the connection manager, table registry, and document model into a
//! concrete [`RemoteDriver`]. Every data operation resolves its table through
//! the same path: connection guard first, then the memoized registry entry,
//! then the collection operation.

use crate::config::DriverConfig;
use crate::connection::ConnectionManager;
use crate::document::KvEntry;
use crate::driver::contract::RemoteDriver;
use crate::error::Result;
use crate::registry::TableRegistry;
use crate::store::{Collection, DocumentStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// Document-store backed driver: the reference implementation of the
/// contract.
pub struct DocumentDriver {
    config: DriverConfig,
    connection: ConnectionManager,
    registry: TableRegistry,
}

impl DocumentDriver {
    /// Creates a driver in the Disconnected state.
    pub fn new(config: DriverConfig) -> Self {
        Self {
            config,
            connection: ConnectionManager::new(),
            registry: TableRegistry::new(),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_connected()
    }

    /// Resolves the collection handle for `table`, creating and memoizing it
    /// on first use. On creation, registers the expiring index on
    /// `expire_at`; registration is best-effort and its failure is silent by
    /// design (logged, never surfaced), so `prepare` cannot fail on it.
    fn table(&self, table: &str) -> Result<Arc<Collection>> {
        let handle = self.connection.handle()?;
        Ok(self.registry.resolve(table, || {
            let name = self.config.collection_name(table);
            let coll = handle.collection(&name);
            if let Err(err) = handle.ensure_expiring_index(&name) {
                warn!(table, collection = %name, %err, "expiring index registration failed");
            }
            debug!(table, collection = %name, "table handle created");
            coll
        }))
    }

    /// Upsert with an explicit expiry: once `expire_at` is reached the store
    /// removes the entry asynchronously, and reads treat it as absent
    /// immediately. Store-specific extension, not part of the contract.
    pub async fn set_row_with_expiry(
        &self,
        table: &str,
        key: &str,
        value: Value,
        expire_at: DateTime<Utc>,
    ) -> Result<Value> {
        self.table(table)?.upsert(key, value, Some(expire_at))
    }
}

#[async_trait]
impl RemoteDriver for DocumentDriver {
    async fn connect(&self) -> Result<()> {
        if self.connection.is_connected() {
            return Ok(());
        }
        let handle = Arc::new(DocumentStore::connect(&self.config)?);
        if !self.connection.install(handle) {
            // lost a connect race; the winner's handle stays live
            return Ok(());
        }
        debug!(address = %self.config.address, "driver connected");
        Ok(())
    }

    async fn disconnect(&self) -> Result<()> {
        if let Some(handle) = self.connection.disconnect() {
            handle.shutdown();
            // cached table handles are stale once the connection is gone
            self.registry.clear();
            debug!("driver disconnected");
        }
        Ok(())
    }

    async fn prepare(&self, table: &str) -> Result<()> {
        self.table(table)?;
        Ok(())
    }

    async fn get_all_rows(&self, table: &str) -> Result<Vec<KvEntry>> {
        self.table(table)?.find_all()
    }

    async fn get_row_by_key(&self, table: &str, key: &str) -> Result<Option<Value>> {
        self.table(table)?.find_by_id(key)
    }

    async fn get_starts_with(&self, table: &str, prefix: &str) -> Result<Vec<KvEntry>> {
        self.table(table)?.find_starts_with(prefix)
    }

    async fn set_row_by_key(
        &self,
        table: &str,
        key: &str,
        value: Value,
        _update: bool,
    ) -> Result<Value> {
        let stored = self.table(table)?.upsert(key, value, None)?;
        debug!(table, key, "row upserted");
        Ok(stored)
    }

    async fn delete_all_rows(&self, table: &str) -> Result<u64> {
        let removed = self.table(table)?.delete_all();
        debug!(table, removed, "table cleared");
        Ok(removed)
    }

    async fn delete_row_by_key(&self, table: &str, key: &str) -> Result<u64> {
        Ok(self.table(table)?.delete_by_id(key))
    }
}
