//! In-memory driver.
//!
//! A minimal backend implementing the same contract over a mutex-guarded
//! map: same connect gating, upsert, prefix, and count semantics as the
//! reference driver. Useful for tests and for exercising facade code without
//! a store; expiry is honored at read time only (no background sweeper).

use crate::document::KvEntry;
use crate::driver::contract::RemoteDriver;
use crate::error::{Error, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Clone)]
struct Entry {
    value: Value,
    expire_at: Option<DateTime<Utc>>,
}

impl Entry {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expire_at.map_or(true, |at| at > now)
    }
}

/// Contract-conformant in-memory backend.
#[derive(Default)]
pub struct MemoryDriver {
    connected: AtomicBool,
    tables: Mutex<HashMap<String, HashMap<String, Entry>>>,
}

impl MemoryDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn guard(&self) -> Result<()> {
        if self.is_connected() {
            Ok(())
        } else {
            Err(Error::NotConnected)
        }
    }

    /// Upsert with an explicit expiry; expired entries read as absent.
    pub async fn set_row_with_expiry(
        &self,
        table: &str,
        key: &str,
        value: Value,
        expire_at: DateTime<Utc>,
    ) -> Result<Value> {
        self.guard()?;
        let mut tables = self.tables.lock();
        tables.entry(table.to_string()).or_default().insert(
            key.to_string(),
            Entry {
                value: value.clone(),
                expire_at: Some(expire_at),
            },
        );
        Ok(value)
    }
}

#[async_trait]
impl RemoteDriver for MemoryDriver {
    async fn connect(&self) -> Result<()> {
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn disconnect(&self) -> Result<()> {
        self.connected.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn prepare(&self, table: &str) -> Result<()> {
        self.guard()?;
        self.tables.lock().entry(table.to_string()).or_default();
        Ok(())
    }

    async fn get_all_rows(&self, table: &str) -> Result<Vec<KvEntry>> {
        self.guard()?;
        let now = Utc::now();
        Ok(self
            .tables
            .lock()
            .get(table)
            .map(|rows| {
                rows.iter()
                    .filter(|(_, entry)| entry.is_live(now))
                    .map(|(id, entry)| KvEntry::new(id.clone(), entry.value.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get_row_by_key(&self, table: &str, key: &str) -> Result<Option<Value>> {
        self.guard()?;
        let now = Utc::now();
        Ok(self
            .tables
            .lock()
            .get(table)
            .and_then(|rows| rows.get(key))
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.value.clone()))
    }

    async fn get_starts_with(&self, table: &str, prefix: &str) -> Result<Vec<KvEntry>> {
        self.guard()?;
        let now = Utc::now();
        Ok(self
            .tables
            .lock()
            .get(table)
            .map(|rows| {
                rows.iter()
                    .filter(|(id, entry)| id.starts_with(prefix) && entry.is_live(now))
                    .map(|(id, entry)| KvEntry::new(id.clone(), entry.value.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn set_row_by_key(
        &self,
        table: &str,
        key: &str,
        value: Value,
        _update: bool,
    ) -> Result<Value> {
        self.guard()?;
        let now = Utc::now();
        let mut tables = self.tables.lock();
        let rows = tables.entry(table.to_string()).or_default();
        match rows.get_mut(key) {
            // a live entry keeps its expiry; an expired one is already
            // absent to readers and gets recreated without it
            Some(entry) if entry.is_live(now) => entry.value = value.clone(),
            _ => {
                rows.insert(
                    key.to_string(),
                    Entry {
                        value: value.clone(),
                        expire_at: None,
                    },
                );
            }
        }
        Ok(value)
    }

    async fn delete_all_rows(&self, table: &str) -> Result<u64> {
        self.guard()?;
        Ok(self
            .tables
            .lock()
            .get_mut(table)
            .map(|rows| {
                let removed = rows.len() as u64;
                rows.clear();
                removed
            })
            .unwrap_or(0))
    }

    async fn delete_row_by_key(&self, table: &str, key: &str) -> Result<u64> {
        self.guard()?;
        Ok(self
            .tables
            .lock()
            .get_mut(table)
            .and_then(|rows| rows.remove(key))
            .map_or(0, |_| 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    #[tokio::test]
    async fn basic_ops() -> Result<()> {
        let driver = MemoryDriver::new();
        driver.connect().await?;

        let stored = driver.set_row_by_key("kv", "k", json!("v"), false).await?;
        assert_eq!(stored, json!("v"));
        assert_eq!(driver.get_row_by_key("kv", "k").await?, Some(json!("v")));

        assert_eq!(driver.delete_row_by_key("kv", "k").await?, 1);
        assert_eq!(driver.get_row_by_key("kv", "k").await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn guards_when_disconnected() {
        let driver = MemoryDriver::new();
        assert!(matches!(
            driver.get_all_rows("kv").await,
            Err(Error::NotConnected)
        ));
    }

    #[tokio::test]
    async fn expired_entries_read_as_absent() -> Result<()> {
        let driver = MemoryDriver::new();
        driver.connect().await?;
        driver
            .set_row_with_expiry("kv", "k", json!(1), Utc::now() - Duration::seconds(1))
            .await?;
        assert_eq!(driver.get_row_by_key("kv", "k").await?, None);
        assert!(driver.get_all_rows("kv").await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn set_over_expired_entry_round_trips() -> Result<()> {
        let driver = MemoryDriver::new();
        driver.connect().await?;
        driver
            .set_row_with_expiry("kv", "k", json!(1), Utc::now() - Duration::seconds(1))
            .await?;
        assert_eq!(driver.get_row_by_key("kv", "k").await?, None);

        driver.set_row_by_key("kv", "k", json!(2), false).await?;
        assert_eq!(driver.get_row_by_key("kv", "k").await?, Some(json!(2)));
        Ok(())
    }

    #[tokio::test]
    async fn missing_table_yields_empty_results() -> Result<()> {
        let driver = MemoryDriver::new();
        driver.connect().await?;
        assert!(driver.get_all_rows("nope").await?.is_empty());
        assert_eq!(driver.delete_all_rows("nope").await?, 0);
        assert_eq!(driver.delete_row_by_key("nope", "k").await?, 0);
        Ok(())
    }
}
