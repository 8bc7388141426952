//! Configuration loaded from `config.toml`.
//!
//! ```toml
//! cache_root = "/var/cache/glyphdeck"
//! default_layer = "F.SilkS"
//!
//! [[layers]]
//! id = "F.SilkS"
//! label = "Front silkscreen"
//!
//! [http]
//! timeout_secs = 10
//! user_agent = "glyphdeck-icon-fetcher"
//! ```
//!
//! Lookup order: the file named by `GLYPHDECK_CONFIG`, then
//! `<config dir>/config.toml`, then built-in defaults. `GLYPHDECK_CACHE_DIR`
//! overrides `cache_root`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use glyphdeck_core::logging::targets;
use glyphdeck_net::NetworkError;
use glyphdeck_net::http::HttpClient;
use serde::{Deserialize, Serialize};

use crate::file::{self, AppPaths, FileError};

/// Environment variable naming an alternate config file.
pub const CONFIG_ENV: &str = "GLYPHDECK_CONFIG";

/// Environment variable overriding the cache root.
pub const CACHE_DIR_ENV: &str = "GLYPHDECK_CACHE_DIR";

/// Errors from reading or validating a config file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Read(#[from] FileError),

    #[error("invalid TOML in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// A layer glyphs can be placed on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerConfig {
    pub id: String,
    pub label: String,
}

impl LayerConfig {
    fn new(id: &str, label: &str) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
        }
    }
}

/// Download settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            user_agent: "glyphdeck-icon-fetcher".to_string(),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlyphdeckConfig {
    /// Cache root; `None` selects the default location.
    pub cache_root: Option<PathBuf>,
    /// Layer preselected on first run.
    pub default_layer: String,
    /// Layers offered to the user, in display order.
    pub layers: Vec<LayerConfig>,
    pub http: HttpSettings,
}

impl Default for GlyphdeckConfig {
    fn default() -> Self {
        Self {
            cache_root: None,
            default_layer: "F.SilkS".to_string(),
            layers: vec![
                LayerConfig::new("F.SilkS", "Front silkscreen"),
                LayerConfig::new("B.SilkS", "Back silkscreen"),
            ],
            http: HttpSettings::default(),
        }
    }
}

impl GlyphdeckConfig {
    /// Loads the configuration from the standard locations.
    ///
    /// Never fails: a missing file yields the defaults, and an unreadable
    /// or invalid one is logged and replaced by the defaults.
    pub fn load() -> Self {
        let explicit = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        let path = explicit
            .clone()
            .or_else(|| AppPaths::new().ok().map(|p| p.config_file()));

        let Some(path) = path else {
            return Self::default();
        };
        if explicit.is_none() && !path.exists() {
            return Self::default();
        }

        match Self::from_path(&path) {
            Ok(config) => {
                tracing::debug!(target: targets::CONFIG, path = %path.display(), "loaded config");
                config
            }
            Err(e) => {
                tracing::warn!(target: targets::CONFIG, path = %path.display(), error = %e, "using default config");
                Self::default()
            }
        }
    }

    /// Reads and validates a config file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = file::read_text(path)?;
        let config: Self = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks cross-field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.layers.is_empty() {
            return Err(ConfigError::Invalid("at least one layer is required".into()));
        }
        if !self.has_layer(&self.default_layer) {
            return Err(ConfigError::Invalid(format!(
                "default layer '{}' is not in the layer list",
                self.default_layer
            )));
        }
        if self.http.timeout_secs == 0 {
            return Err(ConfigError::Invalid("http.timeout_secs must be positive".into()));
        }
        Ok(())
    }

    /// Whether `id` is a configured layer.
    pub fn has_layer(&self, id: &str) -> bool {
        self.layers.iter().any(|l| l.id == id)
    }

    /// Resolves and creates the cache root.
    ///
    /// `GLYPHDECK_CACHE_DIR` wins over `cache_root`, which wins over the
    /// default location.
    pub fn resolve_cache_root(&self) -> Result<PathBuf, FileError> {
        let from_env = std::env::var_os(CACHE_DIR_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        self.cache_root_with_override(from_env)
    }

    fn cache_root_with_override(&self, env_override: Option<PathBuf>) -> Result<PathBuf, FileError> {
        match env_override.or_else(|| self.cache_root.clone()) {
            Some(root) => {
                file::ensure_dir(&root)?;
                Ok(root)
            }
            None => file::default_cache_root(),
        }
    }

    /// HTTP client configured with the download timeout and user agent.
    pub fn http_client(&self) -> Result<HttpClient, NetworkError> {
        HttpClient::builder()
            .timeout(Duration::from_secs(self.http.timeout_secs))
            .user_agent(self.http.user_agent.clone())
            .build()
    }
}
