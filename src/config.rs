//! Construction-time driver configuration.
//!
//! Everything that shapes a driver instance is passed explicitly at
//! construction: the connection target, a map of backend-specific options,
//! and the table-name pluralization toggle. Nothing here is process-wide
//! state.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tracing::warn;

/// Option key controlling the document store's TTL sweep cadence, in
/// milliseconds. Non-numeric values are ignored with a warning.
pub const SWEEP_INTERVAL_MS: &str = "sweep-interval-ms";

/// Default TTL sweep cadence.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_millis(250);

/// Configuration for a driver instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverConfig {
    /// Connection target (address/URI). `connect` rejects an empty target.
    pub address: String,

    /// Backend-specific options. Unrecognized keys are ignored.
    #[serde(default)]
    pub options: HashMap<String, String>,

    /// When true, table names are naively pluralized when mapped to
    /// underlying collection names. Defaults to false.
    #[serde(default)]
    pub pluralize_names: bool,
}

impl DriverConfig {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            options: HashMap::new(),
            pluralize_names: false,
        }
    }

    /// Adds a backend-specific option.
    pub fn option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Sets the table-name pluralization toggle.
    pub fn pluralize_names(mut self, pluralize: bool) -> Self {
        self.pluralize_names = pluralize;
        self
    }

    /// Maps a table name to the underlying collection name.
    pub fn collection_name(&self, table: &str) -> String {
        if self.pluralize_names {
            pluralize(table)
        } else {
            table.to_string()
        }
    }

    /// Resolves the TTL sweep cadence from the option map.
    pub(crate) fn sweep_interval(&self) -> Duration {
        match self.options.get(SWEEP_INTERVAL_MS) {
            None => DEFAULT_SWEEP_INTERVAL,
            Some(raw) => match raw.parse::<u64>() {
                Ok(ms) if ms > 0 => Duration::from_millis(ms),
                _ => {
                    warn!(value = %raw, "invalid sweep-interval-ms option, using default");
                    DEFAULT_SWEEP_INTERVAL
                }
            },
        }
    }
}

/// Naive English pluralization for collection-name mapping. Covers the
/// regular cases only; irregular nouns come out regular ("persons").
fn pluralize(name: &str) -> String {
    if name.ends_with('s')
        || name.ends_with('x')
        || name.ends_with('z')
        || name.ends_with("ch")
        || name.ends_with("sh")
    {
        format!("{name}es")
    } else if let Some(stem) = name.strip_suffix('y') {
        match stem.chars().last() {
            Some(c) if !matches!(c, 'a' | 'e' | 'i' | 'o' | 'u') => format!("{stem}ies"),
            _ => format!("{name}s"),
        }
    } else {
        format!("{name}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_collects_options() {
        let config = DriverConfig::new("local://test")
            .option(SWEEP_INTERVAL_MS, "50")
            .pluralize_names(true);
        assert_eq!(config.address, "local://test");
        assert!(config.pluralize_names);
        assert_eq!(config.sweep_interval(), Duration::from_millis(50));
    }

    #[test]
    fn invalid_sweep_interval_falls_back_to_default() {
        let config = DriverConfig::new("local://test").option(SWEEP_INTERVAL_MS, "soon");
        assert_eq!(config.sweep_interval(), DEFAULT_SWEEP_INTERVAL);

        let config = DriverConfig::new("local://test").option(SWEEP_INTERVAL_MS, "0");
        assert_eq!(config.sweep_interval(), DEFAULT_SWEEP_INTERVAL);
    }

    #[test]
    fn collection_name_mapping() {
        let plain = DriverConfig::new("local://test");
        assert_eq!(plain.collection_name("user"), "user");

        let plural = DriverConfig::new("local://test").pluralize_names(true);
        assert_eq!(plural.collection_name("user"), "users");
        assert_eq!(plural.collection_name("box"), "boxes");
        assert_eq!(plural.collection_name("entry"), "entries");
        assert_eq!(plural.collection_name("day"), "days");
        assert_eq!(plural.collection_name("class"), "classes");
    }
}
