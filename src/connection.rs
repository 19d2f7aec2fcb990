//! Connection lifecycle management.
//!
//! One `ConnectionManager` exclusively owns one store handle and gates every
//! data operation behind it:
//!
//! ```text
//! Disconnected --connect()--> Connected --disconnect()--> Disconnected
//! ```
//!
//! Constructed Disconnected. `disconnect` is idempotent and releases the
//! handle deterministically even if table handles are still registered.

use crate::error::{Error, Result};
use crate::store::StoreHandle;
use parking_lot::RwLock;
use std::sync::Arc;

/// Owner of the store connection handle.
#[derive(Default)]
pub struct ConnectionManager {
    handle: RwLock<Option<Arc<StoreHandle>>>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_connected(&self) -> bool {
        self.handle.read().is_some()
    }

    /// Installs a freshly opened handle. Returns false without replacing
    /// anything when already connected, so a second `connect` cannot corrupt
    /// the live handle.
    pub fn install(&self, handle: Arc<StoreHandle>) -> bool {
        let mut slot = self.handle.write();
        if slot.is_some() {
            return false;
        }
        *slot = Some(handle);
        true
    }

    /// The live handle, or [`Error::NotConnected`]. This is the guard every
    /// data operation runs before touching the store.
    pub fn handle(&self) -> Result<Arc<StoreHandle>> {
        self.handle.read().clone().ok_or(Error::NotConnected)
    }

    /// Releases the handle. No-op when already disconnected.
    pub fn disconnect(&self) -> Option<Arc<StoreHandle>> {
        self.handle.write().take()
    }
}
