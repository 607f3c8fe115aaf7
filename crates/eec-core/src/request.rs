//! Configuration request parsing
//!
//! A [`ConfigRequest`] says which sources take part in a resolution and how
//! to reach them. It is usually built in code by the host program, but can
//! also be loaded from a TOML file:
//!
//! ```toml
//! store_namespace = "cfg/vast-service/"
//! env_namespace = "VAST"
//! required_keys = ["port", "serverName"]
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// API path used when the request does not name one
pub const DEFAULT_STORE_API_PATH: &str = "v3alpha";

/// Store endpoint used when neither the request nor `ETCD_CONN` names one
pub const DEFAULT_STORE_ENDPOINT: &str = "http://localhost:2379";

/// Environment variable holding the store endpoint
pub const STORE_ENDPOINT_VAR: &str = "ETCD_CONN";

/// Milliseconds allowed for the store range query when the request does not say
pub const DEFAULT_STORE_TIMEOUT_MS: u64 = 5_000;

/// Which sources to read and with what parameters
///
/// Absence of a namespace disables that source entirely. Command-line
/// arguments are always read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigRequest {
    /// Key prefix to range-query in the store; enables the store layer
    pub store_namespace: Option<String>,

    /// Store API version path segment (default `v3alpha`)
    pub store_api_path: Option<String>,

    /// Store endpoint; overrides `ETCD_CONN` when set
    pub store_endpoint: Option<String>,

    /// Timeout for the store query in milliseconds (default 5000, 0 for none)
    pub store_timeout_ms: Option<u64>,

    /// Send `application/x-www-form-urlencoded` instead of `application/json`
    ///
    /// Older store deployments were queried with this header even though the
    /// body is JSON.
    pub legacy_content_type: bool,

    /// Environment variable prefix; enables the environment layer
    pub env_namespace: Option<String>,

    /// Normalized keys that must be present after merging
    pub required_keys: Vec<String>,
}

impl ConfigRequest {
    /// A request with every optional source disabled
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a request from TOML content
    pub fn parse(content: &str) -> Result<Self> {
        let request: ConfigRequest = toml::from_str(content)?;
        Ok(request)
    }

    /// Load a request from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    pub fn with_store_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.store_namespace = Some(namespace.into());
        self
    }

    pub fn with_store_api_path(mut self, api_path: impl Into<String>) -> Self {
        self.store_api_path = Some(api_path.into());
        self
    }

    pub fn with_store_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.store_endpoint = Some(endpoint.into());
        self
    }

    /// Sub-millisecond timeouts round up; [`Duration::ZERO`] disables the timeout
    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        let millis = timeout.as_nanos().div_ceil(1_000_000);
        self.store_timeout_ms = Some(u64::try_from(millis).unwrap_or(u64::MAX));
        self
    }

    pub fn with_legacy_content_type(mut self, legacy: bool) -> Self {
        self.legacy_content_type = legacy;
        self
    }

    pub fn with_env_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.env_namespace = Some(namespace.into());
        self
    }

    pub fn with_required_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Store API path, falling back to [`DEFAULT_STORE_API_PATH`]
    pub fn api_path(&self) -> &str {
        self.store_api_path
            .as_deref()
            .unwrap_or(DEFAULT_STORE_API_PATH)
    }

    /// Store query timeout, falling back to [`DEFAULT_STORE_TIMEOUT_MS`]
    ///
    /// `None` when the request sets the timeout to zero.
    pub fn store_timeout(&self) -> Option<Duration> {
        match self.store_timeout_ms.unwrap_or(DEFAULT_STORE_TIMEOUT_MS) {
            0 => None,
            millis => Some(Duration::from_millis(millis)),
        }
    }

    /// Content type header for the range query
    pub fn content_type(&self) -> &'static str {
        if self.legacy_content_type {
            "application/x-www-form-urlencoded"
        } else {
            "application/json"
        }
    }
}
