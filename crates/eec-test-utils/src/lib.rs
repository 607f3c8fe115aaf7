//! Shared test utilities for the config-eec workspace.
//!
//! This crate provides store fixtures so crate test suites do not each
//! hand-roll one. It is a dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`store`]: [`ScriptedTransport`](store::ScriptedTransport) and etcd
//!   response builders
//! - [`server`]: [`StubServer`](server::StubServer), a one-shot HTTP server
//!   for exercising the real transport

pub mod server;
pub mod store;

pub use server::{RecordedRequest, StubServer};
pub use store::{Reply, ScriptedTransport, etcd_range_body};

/// Install a fmt subscriber that writes through the test harness
///
/// Filtering follows `RUST_LOG`. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
