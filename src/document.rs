//! Document model for stored key-value rows.
//!
//! Every KV entry is persisted as one `Document` scoped to its table:
//!
//! ```text
//! Tables (name → Collection)
//!   └─→ Documents (id, opaque data, timestamps, optional expiry)
//! ```
//!
//! The payload is a [`serde_json::Value`]: the driver transports it unchanged
//! and never inspects or validates its shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One stored row: the KV key, its opaque value, and bookkeeping fields.
///
/// `id` is unique within its table; writes to an existing `id` replace `data`
/// in place (upsert) and bump `updated_at` while preserving `created_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// The KV key. Unique within the owning table.
    pub id: String,

    /// The KV value. Opaque to the storage layer.
    pub data: Value,

    /// Set once at insert time.
    pub created_at: DateTime<Utc>,

    /// Bumped on every data replacement.
    pub updated_at: DateTime<Utc>,

    /// When present and reached, the document is eligible for automatic
    /// removal by the store's expiry sweeper.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expire_at: Option<DateTime<Utc>>,
}

impl Document {
    /// Creates a fresh document with both timestamps set to now.
    pub fn new(id: impl Into<String>, data: Value) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            data,
            created_at: now,
            updated_at: now,
            expire_at: None,
        }
    }

    /// Replaces the payload in place, bumping `updated_at`.
    pub fn replace_data(&mut self, data: Value) {
        self.data = data;
        self.updated_at = Utc::now();
    }

    /// Whether the document has passed its expiry at the given instant.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expire_at.is_some_and(|at| at <= now)
    }

    /// Whether the document has passed its expiry.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

/// The row projection scans return: key plus value, no bookkeeping fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KvEntry {
    pub id: String,
    pub value: Value,
}

impl KvEntry {
    pub fn new(id: impl Into<String>, value: Value) -> Self {
        Self {
            id: id.into(),
            value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    #[test]
    fn replace_data_preserves_created_at() {
        let mut doc = Document::new("k", json!(1));
        let created = doc.created_at;
        doc.replace_data(json!(2));
        assert_eq!(doc.data, json!(2));
        assert_eq!(doc.created_at, created);
        assert!(doc.updated_at >= created);
    }

    #[test]
    fn expiry_checks() {
        let mut doc = Document::new("k", json!(null));
        assert!(!doc.is_expired());

        doc.expire_at = Some(Utc::now() - Duration::seconds(1));
        assert!(doc.is_expired());

        doc.expire_at = Some(Utc::now() + Duration::seconds(60));
        assert!(!doc.is_expired());
    }

    #[test]
    fn document_json_round_trip() {
        let doc = Document::new("user:1", json!({"name": "Alice", "age": 30}));
        let encoded = serde_json::to_string(&doc).unwrap();
        let decoded: Document = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded.id, "user:1");
        assert_eq!(decoded.data, doc.data);
        assert_eq!(decoded.expire_at, None);
        // expire_at is omitted from the wire form when unset
        assert!(!encoded.contains("expire_at"));
    }
}
