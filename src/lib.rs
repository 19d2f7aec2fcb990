// kvdriver - pluggable remote storage drivers
// Table-scoped key-value persistence behind one polymorphic contract

#![warn(rust_2018_idioms)]

pub mod config;
pub mod connection;
pub mod document;
pub mod driver;
pub mod registry;
pub mod store;

// Re-exports for convenience
pub use config::DriverConfig;
pub use document::{Document, KvEntry};
pub use driver::{DocumentDriver, MemoryDriver, RemoteDriver};
pub use store::{Collection, DocumentStore, StoreHandle};

/// Driver error types
pub mod error {
    use thiserror::Error;

    #[derive(Error, Debug)]
    pub enum Error {
        /// A data operation was attempted before `connect()` succeeded.
        /// Surfaced immediately, never retried automatically.
        #[error("Not connected: call connect() before data operations")]
        NotConnected,

        /// `connect()` failed: unreachable host or malformed target.
        #[error("Connection error: {0}")]
        Connection(String),

        /// The backing store failed during a CRUD, query, or index call.
        /// Propagated unchanged.
        #[error("Query error: {0}")]
        Query(String),

        /// The payload failed the serde round trip at the storage boundary.
        #[error("Serialization error: {0}")]
        Serialization(String),
    }

    pub type Result<T> = std::result::Result<T, Error>;
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_name_the_failure() {
        let err = error::Error::Connection("empty connection target".to_string());
        assert!(err.to_string().contains("empty connection target"));
        assert!(error::Error::NotConnected.to_string().contains("connect()"));
    }

    #[test]
    fn test_version_format() {
        let _version: &str = VERSION;
    }
}
