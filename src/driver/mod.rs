//! Driver layer.
//!
//! This module provides the storage contract and its backends. A KV facade
//! consumes only the [`RemoteDriver`] trait and never reaches a store
//! directly. [`DocumentDriver`] implements the contract against the embedded
//! document store; [`MemoryDriver`] implements it over a plain in-process
//! map. Backends are interchangeable behind the trait.

pub mod contract;
pub mod document;
pub mod memory;

pub use contract::RemoteDriver;
pub use document::DocumentDriver;
pub use memory::MemoryDriver;
