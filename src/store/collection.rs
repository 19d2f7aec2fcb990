//! Per-table document collection.
//!
//! A `Collection` is the live handle the driver resolves per table: a
//! synchronous core the async driver wraps. Documents are held as opaque
//! serialized blobs behind a single write lock and pass through a serde
//! round trip at the storage boundary. Same-key upserts serialize on that
//! lock, so racing writers converge to one document instead of creating
//! duplicates.
//!
//! Reads treat documents past their `expire_at` as absent immediately; the
//! store's background sweeper handles physical removal.

use crate::document::{Document, KvEntry};
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::warn;

/// A named namespace of documents, keyed by document id.
pub struct Collection {
    name: String,
    docs: RwLock<HashMap<String, Vec<u8>>>,
    expiring_index: AtomicBool,
}

impl Collection {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            docs: RwLock::new(HashMap::new()),
            expiring_index: AtomicBool::new(false),
        }
    }

    /// The underlying collection name (post name-mapping).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Insert-or-replace keyed on id. A live existing document keeps its
    /// `created_at` and gets its data replaced; a missing one is created.
    /// An expired-but-unswept document is already absent to readers, so it
    /// is recreated rather than inheriting the stale expiry. `expire_at =
    /// Some(..)` sets the expiry; `None` leaves a live document's expiry
    /// untouched. Returns the value as stored.
    pub fn upsert(
        &self,
        id: &str,
        value: Value,
        expire_at: Option<DateTime<Utc>>,
    ) -> Result<Value> {
        let mut docs = self.docs.write();
        let existing = match docs.get(id) {
            Some(bytes) => Some(decode_document(bytes)?),
            None => None,
        };
        let doc = match existing {
            Some(mut doc) if !doc.is_expired() => {
                doc.replace_data(value.clone());
                if expire_at.is_some() {
                    doc.expire_at = expire_at;
                }
                doc
            }
            _ => {
                let mut doc = Document::new(id, value.clone());
                doc.expire_at = expire_at;
                doc
            }
        };
        docs.insert(id.to_string(), encode_document(&doc)?);
        Ok(value)
    }

    /// Looks up one live document by id.
    pub fn find_by_id(&self, id: &str) -> Result<Option<Value>> {
        let now = Utc::now();
        match self.docs.read().get(id) {
            Some(bytes) => {
                let doc = decode_document(bytes)?;
                if doc.is_expired_at(now) {
                    Ok(None)
                } else {
                    Ok(Some(doc.data))
                }
            }
            None => Ok(None),
        }
    }

    /// Every live document, unspecified order.
    pub fn find_all(&self) -> Result<Vec<KvEntry>> {
        let now = Utc::now();
        let docs = self.docs.read();
        let mut rows = Vec::with_capacity(docs.len());
        for bytes in docs.values() {
            let doc = decode_document(bytes)?;
            if !doc.is_expired_at(now) {
                rows.push(KvEntry::new(doc.id, doc.data));
            }
        }
        Ok(rows)
    }

    /// Every live document whose id starts with `prefix`, literally compared.
    pub fn find_starts_with(&self, prefix: &str) -> Result<Vec<KvEntry>> {
        let now = Utc::now();
        let docs = self.docs.read();
        let mut rows = Vec::new();
        for (id, bytes) in docs.iter() {
            if !id.starts_with(prefix) {
                continue;
            }
            let doc = decode_document(bytes)?;
            if !doc.is_expired_at(now) {
                rows.push(KvEntry::new(doc.id, doc.data));
            }
        }
        Ok(rows)
    }

    /// Removes the document matching `id`. Returns 0 or 1.
    pub fn delete_by_id(&self, id: &str) -> u64 {
        match self.docs.write().remove(id) {
            Some(_) => 1,
            None => 0,
        }
    }

    /// Removes every document. Returns the number removed.
    pub fn delete_all(&self) -> u64 {
        let mut docs = self.docs.write();
        let removed = docs.len() as u64;
        docs.clear();
        removed
    }

    pub fn len(&self) -> usize {
        self.docs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.read().is_empty()
    }

    /// Whether an expiring index has been registered on `expire_at`.
    pub(crate) fn has_expiring_index(&self) -> bool {
        self.expiring_index.load(Ordering::Relaxed)
    }

    pub(crate) fn register_expiring_index(&self) {
        self.expiring_index.store(true, Ordering::Relaxed);
    }

    /// Physically removes documents past their expiry. Called by the store's
    /// sweeper; returns the number removed. A document that fails to decode
    /// is kept so the next reader surfaces the error.
    pub(crate) fn sweep_expired(&self, now: DateTime<Utc>) -> u64 {
        let mut docs = self.docs.write();
        let before = docs.len();
        docs.retain(|id, bytes| match decode_document(bytes) {
            Ok(doc) => !doc.is_expired_at(now),
            Err(err) => {
                warn!(id = %id, %err, "undecodable document retained during sweep");
                true
            }
        });
        (before - docs.len()) as u64
    }
}

/// Serialize a document for storage.
fn encode_document(doc: &Document) -> Result<Vec<u8>> {
    serde_json::to_vec(doc)
        .map_err(|e| Error::Serialization(format!("failed to encode document: {e}")))
}

/// Deserialize a stored document.
fn decode_document(bytes: &[u8]) -> Result<Document> {
    serde_json::from_slice(bytes)
        .map_err(|e| Error::Serialization(format!("failed to decode document: {e}")))
}
