//! The download client.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use glyphdeck_core::logging::targets;
use http::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::redirect::Policy;
use url::Url;

use super::runtime;
use crate::error::{NetworkError, Result};

/// Whole-request timeout; codepoint tables are a few hundred KiB.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Time allowed for DNS, TCP and TLS setup.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// GitHub raw URLs redirect at most once or twice.
const REDIRECT_LIMIT: usize = 5;

/// `User-Agent` sent unless configured otherwise.
pub fn default_user_agent() -> String {
    format!("glyphdeck/{}", env!("CARGO_PKG_VERSION"))
}

/// Settings baked into an [`HttpClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpClientConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub user_agent: String,
    /// `Accept` header sent with every request.
    pub accept: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            user_agent: default_user_agent(),
            accept: "text/plain, */*;q=0.8".to_string(),
        }
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug, Clone, Default)]
pub struct HttpClientBuilder {
    config: HttpClientConfig,
}

impl HttpClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whole-request timeout, including reading the body.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    #[must_use]
    pub fn accept(mut self, accept: impl Into<String>) -> Self {
        self.config.accept = accept.into();
        self
    }

    /// Builds the client.
    ///
    /// Fails with [`NetworkError::InvalidHeader`] if the user agent or accept
    /// value is not a valid header value.
    pub fn build(self) -> Result<HttpClient> {
        let user_agent = HeaderValue::from_str(&self.config.user_agent)?;
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_str(&self.config.accept)?);

        let client = reqwest::Client::builder()
            .timeout(self.config.timeout)
            .connect_timeout(self.config.connect_timeout)
            .redirect(Policy::limited(REDIRECT_LIMIT))
            .user_agent(user_agent)
            .default_headers(headers)
            .build()?;

        tracing::debug!(
            target: targets::HTTP,
            timeout_ms = self.config.timeout.as_millis() as u64,
            user_agent = %self.config.user_agent,
            "http client ready"
        );
        Ok(HttpClient {
            inner: Arc::new(ClientInner {
                client,
                config: self.config,
            }),
        })
    }
}

struct ClientInner {
    client: reqwest::Client,
    config: HttpClientConfig,
}

/// Downloads whole resources over HTTP(S).
///
/// Clones share one connection pool.
#[derive(Clone)]
pub struct HttpClient {
    inner: Arc<ClientInner>,
}

impl HttpClient {
    /// A client with the default settings.
    pub fn new() -> Result<Self> {
        HttpClientBuilder::new().build()
    }

    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::new()
    }

    pub fn config(&self) -> &HttpClientConfig {
        &self.inner.config
    }

    /// Downloads `url`, failing with [`NetworkError::HttpStatus`] on any
    /// non-2xx answer.
    pub async fn get_bytes(&self, url: impl AsRef<str>) -> Result<Bytes> {
        let url = download_url(url.as_ref())?;
        tracing::trace!(target: targets::HTTP, %url, "GET");

        let response = self.inner.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::debug!(target: targets::HTTP, %url, status = status.as_u16(), "download rejected");
            return Err(NetworkError::HttpStatus {
                status: status.as_u16(),
                reason: status.canonical_reason().map(str::to_string),
            });
        }

        let body = response.bytes().await?;
        tracing::debug!(target: targets::HTTP, %url, size = body.len(), "download complete");
        Ok(body)
    }

    /// [`get_bytes`](Self::get_bytes) for plain threads, run on the shared
    /// runtime.
    ///
    /// Panics if called from inside an async context.
    pub fn get_bytes_blocking(&self, url: impl AsRef<str>) -> Result<Bytes> {
        runtime::block_on(self.get_bytes(url))?
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

/// Parses `url`, accepting only http and https.
fn download_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url)?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(NetworkError::InvalidUrl(format!("unsupported scheme '{other}' in {url}"))),
    }
}
