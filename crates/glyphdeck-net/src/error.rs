//! Download failures.

use std::fmt;

/// Why a download failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    /// The URL does not parse or is not http(s).
    InvalidUrl(String),
    /// A configured header value is not valid HTTP.
    InvalidHeader(String),
    /// No complete response within the configured timeout.
    Timeout,
    /// DNS, TCP or TLS setup failed.
    Connection(String),
    /// The server answered with a non-2xx status.
    HttpStatus {
        status: u16,
        /// Canonical reason phrase, when the status has one.
        reason: Option<String>,
    },
    /// The redirect limit was hit.
    TooManyRedirects,
    /// The response body could not be read.
    Body(String),
    /// The shared async runtime could not be started.
    Runtime(String),
    /// Any other transport failure.
    Request(String),
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidUrl(msg) => write!(f, "invalid download URL: {msg}"),
            Self::InvalidHeader(msg) => write!(f, "invalid header value: {msg}"),
            Self::Timeout => f.write_str("download timed out"),
            Self::Connection(msg) => write!(f, "could not connect: {msg}"),
            Self::HttpStatus {
                status,
                reason: Some(reason),
            } => write!(f, "server returned {status} {reason}"),
            Self::HttpStatus { status, reason: None } => write!(f, "server returned {status}"),
            Self::TooManyRedirects => f.write_str("too many redirects"),
            Self::Body(msg) => write!(f, "failed to read response body: {msg}"),
            Self::Runtime(msg) => write!(f, "async runtime unavailable: {msg}"),
            Self::Request(msg) => write!(f, "request failed: {msg}"),
        }
    }
}

impl std::error::Error for NetworkError {}

impl NetworkError {
    /// Whether the same download may succeed later without any change on
    /// our side.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout | Self::Connection(_) => true,
            Self::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for NetworkError {
    fn from(err: reqwest::Error) -> Self {
        match err {
            e if e.is_timeout() => Self::Timeout,
            e if e.is_connect() => Self::Connection(e.to_string()),
            e if e.is_redirect() => Self::TooManyRedirects,
            e if e.is_body() || e.is_decode() => Self::Body(e.to_string()),
            e => Self::Request(e.to_string()),
        }
    }
}

impl From<url::ParseError> for NetworkError {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidUrl(err.to_string())
    }
}

impl From<http::header::InvalidHeaderValue> for NetworkError {
    fn from(err: http::header::InvalidHeaderValue) -> Self {
        Self::InvalidHeader(err.to_string())
    }
}

/// Result alias for this crate.
pub type Result<T> = std::result::Result<T, NetworkError>;
