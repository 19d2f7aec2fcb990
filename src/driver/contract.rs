//! The remote driver contract.

use crate::document::KvEntry;
use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;

/// The polymorphic storage contract the KV facade depends on.
///
/// Every backend (document store, relational, embedded, in-memory) must
/// reproduce these semantics identically so application code stays
/// backend-agnostic. The facade never accesses a store except through this
/// trait.
///
/// All operations except [`connect`](RemoteDriver::connect) fail with
/// [`Error::NotConnected`](crate::error::Error::NotConnected) while
/// disconnected, checked before any store access. Absence (missing key,
/// empty prefix match, empty table) is a normal result, never an error.
#[async_trait]
pub trait RemoteDriver: Send + Sync {
    /// Opens the backend connection. Fails with
    /// [`Error::Connection`](crate::error::Error::Connection) on an
    /// unreachable or malformed target. Calling it again while connected
    /// must not corrupt state.
    async fn connect(&self) -> Result<()>;

    /// Releases the connection. No-op when already disconnected.
    async fn disconnect(&self) -> Result<()>;

    /// Ensures a table handle exists for `table`, creating it if absent.
    async fn prepare(&self, table: &str) -> Result<()>;

    /// Every live (non-expired) entry in `table`, unspecified order.
    async fn get_all_rows(&self, table: &str) -> Result<Vec<KvEntry>>;

    /// Looks up one entry by key. `None` when absent; `Some(Value::Null)`
    /// when the stored value is itself null, a distinct valid state.
    async fn get_row_by_key(&self, table: &str, key: &str) -> Result<Option<Value>>;

    /// Every entry whose key starts with `prefix`, compared literally
    /// (anchored starts-with, no pattern-language semantics).
    async fn get_starts_with(&self, table: &str, prefix: &str) -> Result<Vec<KvEntry>>;

    /// Upserts: creates the entry if absent, replaces its value if present.
    /// Never a blind insert, so repeated writes to one key cannot create
    /// duplicates. Returns the value as stored. `update` is reserved for
    /// backend-specific merge-vs-replace behavior; backends that only
    /// support full replace ignore it.
    async fn set_row_by_key(
        &self,
        table: &str,
        key: &str,
        value: Value,
        update: bool,
    ) -> Result<Value>;

    /// Removes every entry in `table`. Returns the number removed, 0 for an
    /// absent or empty table.
    async fn delete_all_rows(&self, table: &str) -> Result<u64>;

    /// Removes the entry matching `key`. Returns 0 or 1.
    async fn delete_row_by_key(&self, table: &str, key: &str) -> Result<u64>;
}
