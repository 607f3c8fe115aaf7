//! End-to-end integration tests over a real HTTP socket
//!
//! These tests exercise the complete flow: request -> HTTP range query ->
//! environment -> arguments -> resolved map.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use eec_core::{ConfigRequest, ConfigResolver, Error, MapEnv, Source};
use eec_test_utils::{StubServer, etcd_range_body, init_tracing};
use pretty_assertions::assert_eq;
use std::collections::BTreeMap;
use std::net::TcpListener;
use std::time::Duration;

fn map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_resolve_all_three_layers_over_http() {
    init_tracing();
    let server = StubServer::start(
        200,
        etcd_range_body(&[
            ("cfg/vast-service/db_host", "etcd-db"),
            ("cfg/vast-service/db_port", "5432"),
            ("cfg/vast-service/log_level", "info"),
        ]),
    );
    let env = MapEnv::from_pairs([
        ("ETCD_CONN", server.endpoint().as_str()),
        ("VAST_DB_HOST", "env-db"),
        ("HOME", "/root"),
    ]);
    let request = ConfigRequest::new()
        .with_store_namespace("cfg/vast-service/")
        .with_env_namespace("VAST");

    let config = ConfigResolver::new(request)
        .resolve(&env, &["/usr/bin/vast", "--log-level=debug", "serve"])
        .unwrap();

    assert_eq!(
        config.as_map(),
        &map(&[("dbHost", "env-db"), ("dbPort", "5432"), ("logLevel", "debug")])
    );
    assert_eq!(config.source_of("dbPort"), Some(Source::Store));

    let received = server.received();
    assert_eq!(received.method, "POST");
    assert_eq!(received.path, "/v3alpha/kv/range");
    assert_eq!(received.header("content-type"), Some("application/json"));

    let body = received.json();
    assert_eq!(body["key"], STANDARD.encode("cfg/vast-service/"));
    assert_eq!(body["range_end"], STANDARD.encode("cfg/vast-service0"));
}

#[test]
fn test_legacy_header_and_custom_api_path() {
    let server = StubServer::start(200, r#"{"header":{"revision":"1"}}"#);
    let request = ConfigRequest::new()
        .with_store_namespace("cfg/")
        .with_store_endpoint(format!("{}/", server.endpoint()))
        .with_store_api_path("v3")
        .with_legacy_content_type(true);

    let config = ConfigResolver::new(request)
        .resolve(&MapEnv::new(), &["prog"])
        .unwrap();
    assert!(config.is_empty());

    let received = server.received();
    assert_eq!(received.path, "/v3/kv/range");
    assert_eq!(
        received.header("Content-Type"),
        Some("application/x-www-form-urlencoded")
    );
}

#[test]
fn test_sub_second_timeout_reaches_live_store() {
    let server = StubServer::start(200, etcd_range_body(&[("cfg/port", "9000")]));
    let request = ConfigRequest::new()
        .with_store_namespace("cfg/")
        .with_store_endpoint(server.endpoint())
        .with_store_timeout(Duration::from_millis(500));

    let config = ConfigResolver::new(request)
        .resolve(&MapEnv::new(), &["prog"])
        .unwrap();

    assert_eq!(config.get("port"), Some("9000"));
    let _ = server.received();
}

#[test]
fn test_zero_timeout_waits_for_store() {
    let server = StubServer::start(200, "{}");
    let request = ConfigRequest::parse(&format!(
        "store_namespace = \"cfg/\"\nstore_endpoint = \"{}\"\nstore_timeout_ms = 0\n",
        server.endpoint()
    ))
    .unwrap();

    let config = ConfigResolver::new(request)
        .resolve(&MapEnv::new(), &["prog"])
        .unwrap();

    assert!(config.is_empty());
    let _ = server.received();
}

#[test]
fn test_error_status_fails_resolution() {
    let server = StubServer::start(404, r#"{"error":"Not Found","code":5}"#);
    let request = ConfigRequest::new()
        .with_store_namespace("cfg/")
        .with_store_endpoint(server.endpoint());

    let err = ConfigResolver::new(request)
        .resolve(&MapEnv::new(), &["prog", "--port=80"])
        .unwrap_err();

    assert!(matches!(err, Error::StoreStatus { status: 404, .. }), "got {err:?}");
    let _ = server.received();
}

#[test]
fn test_unreachable_store_strict_and_lenient() {
    let port = TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let request = ConfigRequest::new()
        .with_store_namespace("cfg/")
        .with_store_endpoint(format!("http://127.0.0.1:{port}"))
        .with_env_namespace("APP")
        .with_required_keys(["port"]);
    let env = MapEnv::from_pairs([("APP_PORT", "8080")]);
    let resolver = ConfigResolver::new(request);

    let err = resolver.resolve(&env, &["prog"]).unwrap_err();
    assert!(matches!(err, Error::Transport { .. }), "got {err:?}");

    let resolution = resolver.resolve_lenient(&env, &["prog", "--verbose"]);
    assert!(resolution.store_error.is_some());
    assert!(resolution.missing_keys.is_empty());
    assert_eq!(
        resolution.config.into_map(),
        map(&[("port", "8080"), ("verbose", "true")])
    );
}

#[test]
fn test_resolved_config_serializes_to_json() {
    let server = StubServer::start(200, etcd_range_body(&[("svc/name", "alpha")]));
    let request = ConfigRequest::new()
        .with_store_namespace("svc/")
        .with_store_endpoint(server.endpoint());

    let config = ConfigResolver::new(request)
        .resolve(&MapEnv::new(), &["prog", "--replicas=3"])
        .unwrap();

    let json = serde_json::to_value(&config).unwrap();
    assert_eq!(json, serde_json::json!({"name": "alpha", "replicas": "3"}));
    let _ = server.received();
}
