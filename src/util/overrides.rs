//! Override property sources.
//!
//! Overrides take precedence over every property a descriptor declares.
//! They are passed in explicitly through the [`GlobalContext`] so loading
//! never depends on hidden process state.
//!
//! [`GlobalContext`]: crate::util::GlobalContext

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

/// Property that pins the workspace root directory.
pub const TOP_LEVEL_BASEDIR: &str = "maven.top-level-basedir";

/// A read-only source of override properties.
pub trait OverrideSource: fmt::Debug + Send + Sync {
    /// Look up a property by name.
    fn get(&self, name: &str) -> Option<String>;
}

/// Overrides backed by an in-memory map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapOverrides {
    values: IndexMap<String, String>,
}

impl MapOverrides {
    /// Create an empty override map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert or replace a value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<IndexMap<String, String>> for MapOverrides {
    fn from(values: IndexMap<String, String>) -> Self {
        MapOverrides { values }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapOverrides {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        MapOverrides {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl OverrideSource for MapOverrides {
    fn get(&self, name: &str) -> Option<String> {
        self.values.get(name).cloned()
    }
}

/// Overrides read from the process environment at lookup time.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvOverrides;

impl OverrideSource for EnvOverrides {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// Several sources consulted in order; the first hit wins.
#[derive(Debug, Clone, Default)]
pub struct LayeredOverrides {
    layers: Vec<Arc<dyn OverrideSource>>,
}

impl LayeredOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a lower-priority layer.
    pub fn push(mut self, layer: Arc<dyn OverrideSource>) -> Self {
        self.layers.push(layer);
        self
    }
}

impl OverrideSource for LayeredOverrides {
    fn get(&self, name: &str) -> Option<String> {
        self.layers.iter().find_map(|layer| layer.get(name))
    }
}
