//! Logging facilities for glyphdeck.
//!
//! glyphdeck uses the `tracing` crate for instrumentation. Library code only
//! emits events; binaries (or a host embedding the picker) install a
//! subscriber, either their own or the one configured by [`init`]:
//!
//! ```ignore
//! use glyphdeck_core::logging::{self, LogConfig};
//!
//! let config = LogConfig::from_env().with_file("/tmp/glyphdeck.log");
//! logging::init(&config)?;
//! ```
//!
//! Use the constants in [`targets`] to filter by subsystem, for example
//! `GLYPHDECK_LOG=glyphdeck::cache=debug`.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use crate::error::{CoreError, Result};

/// Environment variable holding the tracing filter directives.
pub const LOG_ENV: &str = "GLYPHDECK_LOG";

/// Filter used when [`LOG_ENV`] is unset.
pub const DEFAULT_FILTER: &str = "info";

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Background worker target.
    pub const WORKER: &str = "glyphdeck_core::worker";
    /// HTTP client target.
    pub const HTTP: &str = "glyphdeck_net::http";
    /// Codepoint cache target.
    pub const CACHE: &str = "glyphdeck::cache";
    /// Catalog build target.
    pub const CATALOG: &str = "glyphdeck::catalog";
    /// Search filter target.
    pub const FILTER: &str = "glyphdeck::filter";
    /// Session state persistence target.
    pub const STATE: &str = "glyphdeck::state";
    /// Configuration loading target.
    pub const CONFIG: &str = "glyphdeck::config";
    /// Picker session target.
    pub const PICKER: &str = "glyphdeck::picker";
}

/// Subscriber configuration for [`init`].
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// `EnvFilter` directives, e.g. `info,glyphdeck::cache=debug`.
    pub filter: String,
    /// Append log lines to this file instead of stderr.
    pub file: Option<PathBuf>,
    /// Emit ANSI colors (ignored for file output).
    pub ansi: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_FILTER.to_string(),
            file: None,
            ansi: true,
        }
    }
}

impl LogConfig {
    /// Build a configuration whose filter comes from [`LOG_ENV`].
    pub fn from_env() -> Self {
        let filter = std::env::var(LOG_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_FILTER.to_string());
        Self {
            filter,
            ..Default::default()
        }
    }

    /// Override the filter directives.
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    /// Replace the global level, keeping per-target directives.
    ///
    /// `glyphdeck::cache=trace,warn` raised to `debug` becomes
    /// `debug,glyphdeck::cache=trace`.
    #[must_use]
    pub fn with_default_level(mut self, level: LevelFilter) -> Self {
        let targeted = self
            .filter
            .split(',')
            .map(str::trim)
            .filter(|d| !d.is_empty() && d.parse::<LevelFilter>().is_err());
        self.filter = std::iter::once(level.to_string().to_lowercase())
            .chain(targeted.map(str::to_string))
            .collect::<Vec<_>>()
            .join(",");
        self
    }

    /// Write to the given file in append mode.
    #[must_use]
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        self.file = Some(path.as_ref().to_path_buf());
        self
    }
}

/// Install the global fmt subscriber described by `config`.
///
/// Fails if the filter directives are invalid, the log file cannot be
/// opened, or a global subscriber is already installed.
pub fn init(config: &LogConfig) -> Result<()> {
    let filter = EnvFilter::try_new(&config.filter)
        .map_err(|e| CoreError::LoggingInit(format!("invalid filter {:?}: {e}", config.filter)))?;

    let (writer, ansi) = match &config.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| CoreError::LoggingInit(format!("{}: {e}", path.display())))?;
            (BoxMakeWriter::new(Mutex::new(file)), false)
        }
        None => (BoxMakeWriter::new(std::io::stderr), config.ansi),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(true)
        .try_init()
        .map_err(|e| CoreError::LoggingInit(e.to_string()))?;

    tracing::debug!(target: targets::WORKER, filter = %config.filter, "logging initialized");
    Ok(())
}

/// A guard that keeps a tracing span entered until dropped.
///
/// Used to time catalog builds and filter passes.
#[derive(Debug)]
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    ///
    /// The span will be active until the guard is dropped.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: "glyphdeck::perf", "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}
