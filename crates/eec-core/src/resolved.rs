//! The merged configuration map

use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt;

/// The layer a resolved value came from, in precedence order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Key/value store range query
    Store,
    /// Namespaced environment variables
    Env,
    /// `--key=value` command-line arguments
    Args,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Source::Store => "store",
            Source::Env => "env",
            Source::Args => "args",
        };
        f.write_str(name)
    }
}

/// Normalized key to value mapping produced by one resolution
///
/// Keys are kept sorted. Each key remembers the [`Source`] that wrote it
/// last. Serializes as a flat object of key to value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedConfig {
    values: BTreeMap<String, String>,
    sources: BTreeMap<String, Source>,
}

impl ResolvedConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, replacing whatever an earlier write left for `key`
    pub(crate) fn insert(&mut self, key: String, value: String, source: Source) -> Option<String> {
        if let Some(previous) = self.sources.insert(key.clone(), source) {
            tracing::debug!(%key, %previous, %source, "Overriding config key");
        }
        self.values.insert(key, value)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// The layer that supplied the current value of `key`
    pub fn source_of(&self, key: &str) -> Option<Source> {
        self.sources.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, String> {
        self.values.iter()
    }

    pub fn keys(&self) -> btree_map::Keys<'_, String, String> {
        self.values.keys()
    }

    /// Required keys with no value, in the order given
    pub fn missing<S: AsRef<str>>(&self, required: &[S]) -> Vec<String> {
        required
            .iter()
            .map(AsRef::as_ref)
            .filter(|key| !self.values.contains_key(*key))
            .map(str::to_string)
            .collect()
    }

    pub fn as_map(&self) -> &BTreeMap<String, String> {
        &self.values
    }

    pub fn into_map(self) -> BTreeMap<String, String> {
        self.values
    }
}

impl Serialize for ResolvedConfig {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.values.serialize(serializer)
    }
}

impl IntoIterator for ResolvedConfig {
    type Item = (String, String);
    type IntoIter = btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

impl<'a> IntoIterator for &'a ResolvedConfig {
    type Item = (&'a String, &'a String);
    type IntoIter = btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}
