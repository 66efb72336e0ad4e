//! Record of every component name the registry has started to resolve.

use parking_lot::RwLock;
use std::collections::BTreeMap;

/// Lowercased name -> name as last requested.
///
/// Keys are never removed. A name is recorded before its constructor
/// runs, so a component that failed to build still shows up here.
#[derive(Debug, Default)]
pub struct LoadTracker {
    loaded: RwLock<BTreeMap<String, String>>,
}

impl LoadTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Note `name` as loaded. A later spelling of the same name replaces
    /// the earlier one.
    pub fn record(&self, name: &str) {
        self.loaded
            .write()
            .insert(name.to_lowercase(), name.to_string());
    }

    /// Case-insensitive membership test.
    pub fn is_loaded(&self, name: &str) -> bool {
        self.loaded.read().contains_key(&name.to_lowercase())
    }

    /// Current contents, ordered by lowercased key.
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.loaded.read().clone()
    }

    pub fn len(&self) -> usize {
        self.loaded.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.loaded.read().is_empty()
    }
}
