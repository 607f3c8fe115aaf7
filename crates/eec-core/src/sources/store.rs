//! Store layer: one range query against the etcd v3 JSON gateway
//!
//! ```text
//! POST {endpoint}/{api_path}/kv/range
//! {"key": b64(namespace), "range_end": b64(successor(namespace))}
//!
//! 200 {"kvs": [{"key": b64, "value": b64}, ...]}
//! ```

use crate::normalize::normalize;
use crate::request::{ConfigRequest, DEFAULT_STORE_ENDPOINT, STORE_ENDPOINT_VAR};
use crate::resolved::{ResolvedConfig, Source};
use crate::sources::env::EnvSource;
use crate::transport::{PostRequest, StoreTransport};
use crate::{Error, Result};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Serialize)]
struct RangeRequest {
    key: String,
    range_end: String,
}

#[derive(Debug, Default, Deserialize)]
struct RangeResponse {
    #[serde(default)]
    kvs: Option<Vec<KeyValue>>,
}

// etcd omits empty fields from its JSON
#[derive(Debug, Deserialize)]
struct KeyValue {
    #[serde(default)]
    key: String,
    #[serde(default)]
    value: String,
}

/// Everything needed to run the range query for one resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreQuery {
    pub namespace: String,
    pub endpoint: String,
    pub api_path: String,
    pub content_type: &'static str,
    pub timeout: Option<Duration>,
}

impl StoreQuery {
    /// Build the query for `request`, or `None` when the store layer is off
    ///
    /// The endpoint is the request's `store_endpoint`, then `ETCD_CONN` from
    /// `env`, then `http://localhost:2379`.
    pub fn from_request(request: &ConfigRequest, env: &dyn EnvSource) -> Option<Self> {
        let namespace = request.store_namespace.clone()?;
        let endpoint = request
            .store_endpoint
            .clone()
            .or_else(|| env.get(STORE_ENDPOINT_VAR))
            .unwrap_or_else(|| DEFAULT_STORE_ENDPOINT.to_string());

        Some(Self {
            namespace,
            endpoint,
            api_path: request.api_path().to_string(),
            content_type: request.content_type(),
            timeout: request.store_timeout(),
        })
    }

    pub fn url(&self) -> String {
        format!(
            "{}/{}/kv/range",
            self.endpoint.trim_end_matches('/'),
            self.api_path
        )
    }

    /// JSON body covering every key that starts with the namespace
    pub fn body(&self) -> Result<String> {
        let request = RangeRequest {
            key: STANDARD.encode(range_key(self.namespace.as_bytes())),
            range_end: STANDARD.encode(range_end(self.namespace.as_bytes())),
        };
        serde_json::to_string(&request).map_err(Error::RequestEncode)
    }

    /// Run the query and return decoded, normalized pairs
    ///
    /// Nothing is returned unless every pair decodes.
    pub fn fetch(&self, transport: &dyn StoreTransport) -> Result<Vec<(String, String)>> {
        let url = self.url();
        let body = self.body()?;
        let text = transport.post(&PostRequest {
            url: &url,
            content_type: self.content_type,
            body: &body,
            timeout: self.timeout,
        })?;

        let response: RangeResponse = if text.trim().is_empty() {
            RangeResponse::default()
        } else {
            serde_json::from_str(&text)
                .map_err(|source| Error::InvalidResponse { url: url.clone(), source })?
        };

        response
            .kvs
            .unwrap_or_default()
            .iter()
            .map(|kv| {
                let key = decode("key", &kv.key)?;
                let value = decode("value", &kv.value)?;
                Ok((normalize(&key, Some(self.namespace.as_str())), value))
            })
            .collect()
    }
}

/// Query the store and write every pair into `config`
///
/// Returns the number of pairs written.
pub fn load_store(
    query: &StoreQuery,
    transport: &dyn StoreTransport,
    config: &mut ResolvedConfig,
) -> Result<usize> {
    let pairs = query.fetch(transport)?;
    let count = pairs.len();
    for (key, value) in pairs {
        config.insert(key, value, Source::Store);
    }
    Ok(count)
}

/// Start of the range; etcd reads `"\0"` as the lowest key
pub fn range_key(namespace: &[u8]) -> Vec<u8> {
    if namespace.is_empty() {
        vec![0]
    } else {
        namespace.to_vec()
    }
}

/// Smallest key greater than every key prefixed by `namespace`
///
/// Trailing `0xff` bytes are dropped and the last remaining byte is
/// incremented. With nothing left to increment the result is `"\0"`, which
/// etcd reads as "no upper bound".
pub fn range_end(namespace: &[u8]) -> Vec<u8> {
    let mut end = namespace.to_vec();
    while let Some(last) = end.pop() {
        if last < 0xff {
            end.push(last + 1);
            return end;
        }
    }
    vec![0]
}

fn decode(field: &'static str, encoded: &str) -> Result<String> {
    let bytes = STANDARD
        .decode(encoded)
        .map_err(|source| Error::Base64 { field, source })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
