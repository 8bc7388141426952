//! HTTP downloads.
//!
//! ```ignore
//! use glyphdeck_net::http::HttpClient;
//!
//! let client = HttpClient::builder().user_agent("glyphdeck-icon-fetcher").build()?;
//! let body = client
//!     .get_bytes("https://raw.githubusercontent.com/google/material-design-icons/master/README.md")
//!     .await?;
//! ```

mod client;
pub mod runtime;

pub use client::{
    DEFAULT_CONNECT_TIMEOUT, DEFAULT_TIMEOUT, HttpClient, HttpClientBuilder, HttpClientConfig,
    default_user_agent,
};
