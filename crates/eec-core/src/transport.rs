//! HTTP transport to the key/value store
//!
//! The store layer builds the request and decodes the response itself; the
//! transport only moves bytes. [`HttpTransport`] is the real implementation,
//! tests substitute their own.

use crate::{Error, Result};
use std::time::Duration;

/// A single POST to the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostRequest<'a> {
    pub url: &'a str,
    pub content_type: &'a str,
    pub body: &'a str,
    /// Connect and overall deadline; `None` waits indefinitely
    pub timeout: Option<Duration>,
}

/// Sends a POST and returns the response body of a successful reply
///
/// Implementations map connection problems to [`Error::Transport`] and
/// non-success statuses to [`Error::StoreStatus`].
pub trait StoreTransport {
    fn post(&self, request: &PostRequest<'_>) -> Result<String>;
}

/// Blocking HTTP transport backed by a `ureq` agent
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpTransport;

impl HttpTransport {
    pub fn new() -> Self {
        Self
    }
}

impl StoreTransport for HttpTransport {
    fn post(&self, request: &PostRequest<'_>) -> Result<String> {
        let mut builder = ureq::AgentBuilder::new();
        if let Some(timeout) = request.timeout {
            builder = builder.timeout_connect(timeout).timeout(timeout);
        }
        let agent = builder.build();

        tracing::debug!(url = request.url, timeout = ?request.timeout, "POST to store");
        let response = match agent
            .post(request.url)
            .set("Content-Type", request.content_type)
            .send_string(request.body)
        {
            Ok(response) => response,
            Err(ureq::Error::Status(status, _)) => {
                return Err(Error::StoreStatus {
                    url: request.url.to_string(),
                    status,
                });
            }
            Err(ureq::Error::Transport(transport)) => {
                return Err(Error::Transport {
                    url: request.url.to_string(),
                    message: transport.to_string(),
                });
            }
        };

        response.into_string().map_err(|e| Error::Transport {
            url: request.url.to_string(),
            message: format!("failed reading response body: {e}"),
        })
    }
}
