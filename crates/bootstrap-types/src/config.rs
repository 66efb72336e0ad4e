//! In-memory configuration table behind the [`ConfigStore`] port.

use crate::ports::{ConfigStore, ConfigValue};
use parking_lot::RwLock;
use tracing::debug;

/// Configuration held as a TOML table.
///
/// Loading happens once, elsewhere; this type only serves lookups and runtime
/// replacements.
#[derive(Debug, Default)]
pub struct ConfigTable {
    values: RwLock<toml::Table>,
}

impl ConfigTable {
    pub fn new(values: toml::Table) -> Self {
        Self {
            values: RwLock::new(values),
        }
    }

    /// Copy of every key currently set.
    pub fn snapshot(&self) -> toml::Table {
        self.values.read().clone()
    }

    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.read().is_empty()
    }
}

impl ConfigStore for ConfigTable {
    fn item(&self, key: &str) -> Option<ConfigValue> {
        self.values.read().get(key).cloned()
    }

    fn set_item(&self, key: &str, value: ConfigValue) {
        debug!("[Config] Replacing item {}", key);
        self.values.write().insert(key.to_string(), value);
    }
}
