//! Document store layer.
//!
//! This module provides the embedded store the reference driver binds to.
//! [`DocumentStore::connect`] issues a [`StoreHandle`], the single owned
//! connection through which all collection access flows; the handle also
//! owns the background expiry sweeper. Each [`Collection`] holds one table's
//! documents and supports upsert, key lookup, prefix scan, and bulk delete.

pub mod collection;
pub mod engine;

pub use collection::Collection;
pub use engine::{DocumentStore, StoreHandle};
