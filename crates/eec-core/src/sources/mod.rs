//! The three configuration layers, in precedence order
//!
//! Each layer normalizes its keys and writes straight into the shared
//! [`ResolvedConfig`](crate::ResolvedConfig); a later layer overwrites
//! whatever an earlier one wrote for the same key.

pub mod args;
pub mod env;
pub mod store;

pub use args::{load_args, parse_arg};
pub use env::{EnvSource, MapEnv, ProcessEnv, load_env};
pub use store::{StoreQuery, load_store, range_end};
