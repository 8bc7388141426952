//! HTTP plumbing for glyphdeck.
//!
//! Icon metadata is small and fetched rarely, so this crate stays narrow: a
//! configured [`HttpClient`](http::HttpClient) over reqwest that downloads
//! whole bodies, and a process-wide tokio runtime that lets synchronous
//! callers (the background download worker, the CLI) drive it.
//!
//! ```ignore
//! use std::time::Duration;
//! use glyphdeck_net::http::HttpClient;
//!
//! let client = HttpClient::builder()
//!     .timeout(Duration::from_secs(10))
//!     .user_agent("glyphdeck-icon-fetcher")
//!     .build()?;
//!
//! // From async code
//! let body = client.get_bytes(url).await?;
//!
//! // From a plain thread
//! let body = client.get_bytes_blocking(url)?;
//! ```

mod error;
pub mod http;

pub use error::{NetworkError, Result};
pub use http::{HttpClient, HttpClientBuilder, HttpClientConfig};
