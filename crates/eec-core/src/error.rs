//! Error types for eec-core

use std::path::PathBuf;

/// Result type for eec-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving configuration
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The store could not be reached, timed out, or its body could not be read
    #[error("Unable to get config from {url}: {message}")]
    Transport { url: String, message: String },

    /// The store answered with a non-success HTTP status
    #[error("Unable to get config from {url}: store returned HTTP {status}")]
    StoreStatus { url: String, status: u16 },

    /// The store response is not a valid range response
    #[error("Invalid range response from {url}: {source}")]
    InvalidResponse {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// The range request body could not be encoded
    #[error("Failed to encode range request: {0}")]
    RequestEncode(#[source] serde_json::Error),

    /// A key or value in the range response is not valid base64
    #[error("Invalid base64 in store {field}: {source}")]
    Base64 {
        field: &'static str,
        #[source]
        source: base64::DecodeError,
    },

    /// Required keys are absent from the resolved configuration
    #[error("Missing required config keys: {}", .keys.join(", "))]
    MissingKeys { keys: Vec<String> },

    /// Configuration request file could not be read
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration request TOML is malformed
    #[error(transparent)]
    RequestParse(#[from] toml::de::Error),
}

impl Error {
    /// Whether this error came from talking to the store
    pub fn is_store_failure(&self) -> bool {
        matches!(
            self,
            Error::Transport { .. }
                | Error::StoreStatus { .. }
                | Error::RequestEncode(_)
                | Error::InvalidResponse { .. }
                | Error::Base64 { .. }
        )
    }
}
