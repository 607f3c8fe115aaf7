//! Environment layer
//!
//! Reads variables whose name starts with the namespace, e.g. with namespace
//! `VAST`:
//!
//! ```text
//! VAST_DB_HOST=myhost   -> dbHost = myhost
//! VAST_PORT=8080        -> port   = 8080
//! OTHER_VAR=x           -> (skipped)
//! ```

use crate::normalize::normalize;
use crate::resolved::{ResolvedConfig, Source};
use std::collections::BTreeMap;

/// Read-only view of an environment table
pub trait EnvSource {
    /// Value of one variable
    fn get(&self, name: &str) -> Option<String>;

    /// Every variable
    fn vars(&self) -> Box<dyn Iterator<Item = (String, String)> + '_>;
}

/// The real process environment
///
/// Variables whose name or value is not valid Unicode are invisible.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }

    fn vars(&self) -> Box<dyn Iterator<Item = (String, String)> + '_> {
        Box::new(
            std::env::vars_os()
                .filter_map(|(name, value)| Some((name.into_string().ok()?, value.into_string().ok()?))),
        )
    }
}

/// An in-memory environment table, iterated in name order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapEnv {
    vars: BTreeMap<String, String>,
}

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(iter: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }
}

impl EnvSource for MapEnv {
    fn get(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }

    fn vars(&self) -> Box<dyn Iterator<Item = (String, String)> + '_> {
        Box::new(self.vars.iter().map(|(k, v)| (k.clone(), v.clone())))
    }
}

/// Write every variable in `namespace` into `config`
///
/// The namespace check is an anchored, case-sensitive `starts_with`. The
/// name is then normalized with `{namespace}_` as the strip prefix.
/// Returns the number of variables written.
pub fn load_env(namespace: &str, env: &dyn EnvSource, config: &mut ResolvedConfig) -> usize {
    let strip = format!("{namespace}_");
    let mut count = 0;
    for (name, value) in env.vars() {
        if !name.starts_with(namespace) {
            tracing::trace!(%name, "Skipping variable outside namespace");
            continue;
        }
        config.insert(normalize(&name, Some(strip.as_str())), value, Source::Env);
        count += 1;
    }
    count
}
