//! Remote codepoint downloads against a local mock server.
//!
//! Run with `cargo test -p glyphdeck --features integration-tests`.

#![cfg(feature = "integration-tests")]

mod common;

use std::time::Duration;

use common::{SAMPLE, font};
use glyphdeck::icons::{CacheError, CodepointCache, CodepointSource, RemoteCodepointSource};
use glyphdeck_net::NetworkError;
use glyphdeck_net::http::HttpClient;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// The fetch path blocks on the shared client runtime, so the mock server
/// runs on its own runtime and the test body stays synchronous.
fn mock_server() -> (tokio::runtime::Runtime, MockServer) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let server = rt.block_on(MockServer::start());
    (rt, server)
}

fn remote(server: &MockServer, client: HttpClient) -> RemoteCodepointSource {
    let mut font = font("material-outlined", "Outlined");
    font.codepoints_url = format!("{}/outlined.codepoints", server.uri());
    RemoteCodepointSource::new(font, client)
}

#[test]
fn test_download_is_cached_with_user_agent() {
    let (rt, server) = mock_server();
    rt.block_on(
        Mock::given(method("GET"))
            .and(path("/outlined.codepoints"))
            .and(header("user-agent", "glyphdeck-icon-fetcher"))
            .respond_with(ResponseTemplate::new(200).set_body_string(SAMPLE))
            .expect(1)
            .mount(&server),
    );

    let client = HttpClient::builder()
        .user_agent("glyphdeck-icon-fetcher")
        .build()
        .unwrap();
    let source = remote(&server, client);
    let dir = TempDir::new().unwrap();
    let cache = CodepointCache::new(dir.path());

    assert_eq!(cache.load(&source).unwrap().len(), 3);
    assert_eq!(cache.load(&source).unwrap().len(), 3);

    let info = cache.entry_info(source.id()).unwrap().unwrap();
    assert_eq!(info.url.as_deref(), Some(format!("{}/outlined.codepoints", server.uri()).as_str()));
    rt.block_on(server.verify());
}

#[test]
fn test_not_found_is_a_fetch_error() {
    let (rt, server) = mock_server();
    rt.block_on(
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server),
    );

    let source = remote(&server, HttpClient::new().unwrap());
    let dir = TempDir::new().unwrap();
    let cache = CodepointCache::new(dir.path());

    match cache.load(&source) {
        Err(CacheError::Fetch { error, .. }) => {
            assert!(matches!(error, NetworkError::HttpStatus { status: 404, .. }));
        }
        other => panic!("expected fetch error, got {other:?}"),
    }
    assert!(!dir.path().join("material-outlined.codepoints").exists());
}

#[test]
fn test_slow_server_times_out() {
    let (rt, server) = mock_server();
    rt.block_on(
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(SAMPLE)
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server),
    );

    let client = HttpClient::builder()
        .timeout(Duration::from_millis(200))
        .build()
        .unwrap();
    let source = remote(&server, client);
    let dir = TempDir::new().unwrap();
    let cache = CodepointCache::new(dir.path());

    let err = cache.load(&source).unwrap_err();
    assert!(matches!(
        err,
        CacheError::Fetch {
            error: NetworkError::Timeout,
            ..
        }
    ));
}
