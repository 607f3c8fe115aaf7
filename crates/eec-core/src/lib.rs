//! Layered runtime configuration from a key/value store, the environment
//! and command-line arguments
//!
//! This crate resolves a flat key/value configuration by merging three
//! sources, later ones overriding earlier ones:
//!
//! - **Store**: one range query for every key under a namespace in an
//!   etcd v3 JSON gateway (endpoint from `ETCD_CONN`)
//! - **Environment**: variables whose name starts with a namespace prefix
//! - **Arguments**: `--key=value` command-line arguments
//!
//! Every key is normalized to lowerCamelCase first, so `cfg/app/db_host`,
//! `APP_DB_HOST` and `--db-host` all set `dbHost`.
//!
//! # Architecture
//!
//! ```text
//!          ConfigResolver
//!                |
//!   +------------+------------+
//!   |            |            |
//! store   ->    env    ->   args      (sources, in precedence order)
//!   |            |            |
//!   +------ normalize --------+
//!                |
//!          ResolvedConfig
//! ```
//!
//! # Example
//!
//! ```
//! use eec_core::{ConfigRequest, ConfigResolver, MapEnv};
//!
//! let request = ConfigRequest::new().with_env_namespace("VAST");
//! let env = MapEnv::from_pairs([("VAST_DB_HOST", "myhost")]);
//!
//! let config = ConfigResolver::new(request)
//!     .resolve(&env, &["prog", "--dbPort=5432"])
//!     .unwrap();
//!
//! assert_eq!(config.get("dbHost"), Some("myhost"));
//! assert_eq!(config.get("dbPort"), Some("5432"));
//! ```

pub mod error;
pub mod normalize;
pub mod request;
pub mod resolved;
pub mod resolver;
pub mod sources;
pub mod transport;

pub use error::{Error, Result};
pub use normalize::normalize;
pub use request::ConfigRequest;
pub use resolved::{ResolvedConfig, Source};
pub use resolver::{ConfigResolver, Resolution, resolve_from_process};
pub use sources::{EnvSource, MapEnv, ProcessEnv};
pub use transport::{HttpTransport, PostRequest, StoreTransport};
