//! Table-handle registry.
//!
//! Maps a table name to its live collection handle, created lazily on first
//! use and memoized for the connection's lifetime. Entries are invalid after
//! the owning connection is torn down; the driver clears the registry on
//! disconnect so the next use after a reconnect recreates them.

use crate::store::Collection;
use dashmap::DashMap;
use std::sync::Arc;

/// Name-keyed cache of per-table collection handles.
#[derive(Default)]
pub struct TableRegistry {
    tables: DashMap<String, Arc<Collection>>,
}

impl TableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the memoized handle for `table`, running `create` only on
    /// first use. A race creating the same entry twice is idempotent-safe:
    /// one handle wins the map, the loser is dropped.
    pub fn resolve(
        &self,
        table: &str,
        create: impl FnOnce() -> Arc<Collection>,
    ) -> Arc<Collection> {
        self.tables
            .entry(table.to_string())
            .or_insert_with(create)
            .clone()
    }

    /// Drops every cached handle. Called on disconnect.
    pub fn clear(&self) {
        self.tables.clear();
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_memoizes_per_table() {
        let registry = TableRegistry::new();
        let mut creations = 0;

        let first = registry.resolve("kv", || {
            creations += 1;
            Arc::new(Collection::new("kv"))
        });
        let second = registry.resolve("kv", || {
            creations += 1;
            Arc::new(Collection::new("kv"))
        });

        assert_eq!(creations, 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn clear_invalidates_entries() {
        let registry = TableRegistry::new();
        registry.resolve("kv", || Arc::new(Collection::new("kv")));
        registry.clear();
        assert!(registry.is_empty());
    }
}
