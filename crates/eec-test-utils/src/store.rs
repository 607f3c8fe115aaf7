//! Scripted store transport and etcd response builders

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use eec_core::{Error, PostRequest, Result, StoreTransport};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

/// What the scripted store answers to the next POST
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// 200 with this body
    Body(String),
    /// Non-success status
    Status(u16),
    /// Connection refused
    Unreachable,
}

/// A POST as seen by [`ScriptedTransport`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentPost {
    pub url: String,
    pub content_type: String,
    pub body: String,
    pub timeout: Option<Duration>,
}

impl SentPost {
    /// The request body parsed as JSON
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("SentPost::json: body is not JSON")
    }
}

#[derive(Debug, Default)]
struct Script {
    replies: VecDeque<Reply>,
    sent: Vec<SentPost>,
}

/// Store transport that replays queued replies and records every POST
///
/// Clones share the same script, so a test can keep one handle after
/// moving another into a resolver. Runs out of replies as
/// [`Reply::Unreachable`].
///
/// # Example
///
/// ```rust
/// use eec_test_utils::{Reply, ScriptedTransport, etcd_range_body};
///
/// let transport = ScriptedTransport::new();
/// transport.push(Reply::Body(etcd_range_body(&[("cfg/app/port", "80")])));
/// assert!(transport.sent().is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScriptedTransport {
    script: Rc<RefCell<Script>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transport answering a single range query with `pairs`
    pub fn with_pairs(pairs: &[(&str, &str)]) -> Self {
        let transport = Self::new();
        transport.push(Reply::Body(etcd_range_body(pairs)));
        transport
    }

    /// Queue the reply for the next POST
    pub fn push(&self, reply: Reply) {
        self.script.borrow_mut().replies.push_back(reply);
    }

    /// Every POST received so far
    pub fn sent(&self) -> Vec<SentPost> {
        self.script.borrow().sent.clone()
    }
}

impl StoreTransport for ScriptedTransport {
    fn post(&self, request: &PostRequest<'_>) -> Result<String> {
        let mut script = self.script.borrow_mut();
        script.sent.push(SentPost {
            url: request.url.to_string(),
            content_type: request.content_type.to_string(),
            body: request.body.to_string(),
            timeout: request.timeout,
        });

        match script.replies.pop_front().unwrap_or(Reply::Unreachable) {
            Reply::Body(body) => Ok(body),
            Reply::Status(status) => Err(Error::StoreStatus {
                url: request.url.to_string(),
                status,
            }),
            Reply::Unreachable => Err(Error::Transport {
                url: request.url.to_string(),
                message: "connection refused".to_string(),
            }),
        }
    }
}

/// An etcd range response body holding `pairs`, base64-encoded
pub fn etcd_range_body(pairs: &[(&str, &str)]) -> String {
    let kvs: Vec<serde_json::Value> = pairs
        .iter()
        .map(|(key, value)| {
            serde_json::json!({
                "key": STANDARD.encode(key),
                "value": STANDARD.encode(value),
                "create_revision": "2",
                "mod_revision": "2",
                "version": "1",
            })
        })
        .collect();

    let mut response = serde_json::json!({
        "header": {
            "cluster_id": "14841639068965178418",
            "member_id": "10276657743932975437",
            "revision": "2",
            "raft_term": "2",
        },
    });
    if !kvs.is_empty() {
        response["count"] = serde_json::Value::String(kvs.len().to_string());
        response["kvs"] = serde_json::Value::Array(kvs);
    }
    response.to_string()
}
