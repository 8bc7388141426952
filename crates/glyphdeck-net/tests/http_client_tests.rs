//! HTTP client tests. The wiremock suite needs `--features integration-tests`.

use std::time::Duration;

use glyphdeck_net::NetworkError;
use glyphdeck_net::http::{DEFAULT_TIMEOUT, HttpClient, HttpClientConfig};

#[test]
fn test_default_config() {
    let client = HttpClient::new().unwrap();
    assert_eq!(client.config(), &HttpClientConfig::default());
    assert_eq!(client.config().timeout, DEFAULT_TIMEOUT);
    assert!(client.config().user_agent.starts_with("glyphdeck/"));
}

#[test]
fn test_builder_overrides() {
    let client = HttpClient::builder()
        .timeout(Duration::from_secs(3))
        .connect_timeout(Duration::from_secs(1))
        .user_agent("glyphdeck-icon-fetcher")
        .accept("text/plain")
        .build()
        .unwrap();

    let config = client.config();
    assert_eq!(config.timeout, Duration::from_secs(3));
    assert_eq!(config.connect_timeout, Duration::from_secs(1));
    assert_eq!(config.user_agent, "glyphdeck-icon-fetcher");
    assert_eq!(config.accept, "text/plain");
}

#[test]
fn test_clones_share_config() {
    let client = HttpClient::builder().user_agent("shared").build().unwrap();
    let clone = client.clone();
    assert_eq!(clone.config().user_agent, "shared");
}

#[tokio::test]
async fn test_relative_url_rejected_before_sending() {
    let client = HttpClient::new().unwrap();
    let err = client.get_bytes("MaterialSymbolsOutlined.codepoints").await.unwrap_err();
    assert!(matches!(err, NetworkError::InvalidUrl(_)));
}

#[cfg(feature = "integration-tests")]
mod integration_tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_get_bytes_returns_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/outlined.codepoints"))
            .respond_with(ResponseTemplate::new(200).set_body_string("home e88a\n"))
            .mount(&server)
            .await;

        let client = HttpClient::new().unwrap();
        let body = client
            .get_bytes(format!("{}/outlined.codepoints", server.uri()))
            .await
            .unwrap();
        assert_eq!(&body[..], b"home e88a\n");
    }

    #[tokio::test]
    async fn test_configured_headers_are_sent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("user-agent", "glyphdeck-icon-fetcher"))
            .and(header("accept", "text/plain"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpClient::builder()
            .user_agent("glyphdeck-icon-fetcher")
            .accept("text/plain")
            .build()
            .unwrap();
        client.get_bytes(server.uri()).await.unwrap();
    }

    #[tokio::test]
    async fn test_error_status_is_mapped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/busy"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = HttpClient::new().unwrap();
        let missing = client
            .get_bytes(format!("{}/missing", server.uri()))
            .await
            .unwrap_err();
        assert_eq!(
            missing,
            NetworkError::HttpStatus {
                status: 404,
                reason: Some("Not Found".to_string()),
            }
        );
        assert!(!missing.is_transient());

        let busy = client.get_bytes(format!("{}/busy", server.uri())).await.unwrap_err();
        assert!(busy.is_transient());
    }

    #[tokio::test]
    async fn test_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let client = HttpClient::builder()
            .timeout(Duration::from_millis(200))
            .build()
            .unwrap();
        let err = client.get_bytes(server.uri()).await.unwrap_err();
        assert_eq!(err, NetworkError::Timeout);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_get_bytes_blocking_from_plain_thread() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/blob"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"search e8b6\n".to_vec()))
            .mount(&server)
            .await;

        let url = format!("{}/blob", server.uri());
        let client = HttpClient::new().unwrap();
        // The blocking call needs a thread outside any runtime
        let body = tokio::task::spawn_blocking(move || {
            std::thread::spawn(move || client.get_bytes_blocking(url))
                .join()
                .unwrap()
        })
        .await
        .unwrap()
        .unwrap();

        assert_eq!(&body[..], b"search e8b6\n");
    }
}
