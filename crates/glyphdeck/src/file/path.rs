//! Standard locations for glyphdeck's cache, config and logs.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;

use super::error::{FileError, FileErrorKind, FileResult};
use super::operations::ensure_dir;

/// Name of the cache folder placed next to the executable.
const EXE_CACHE_DIR: &str = "cache";

/// Application-specific directories, following platform conventions.
///
/// | | Linux | macOS | Windows |
/// |---|---|---|---|
/// | config | `~/.config/glyphdeck` | `~/Library/Application Support/glyphdeck` | `%APPDATA%\glyphdeck\config` |
/// | cache | `~/.cache/glyphdeck` | `~/Library/Caches/glyphdeck` | `%LOCALAPPDATA%\glyphdeck\cache` |
#[derive(Debug, Clone)]
pub struct AppPaths {
    config: PathBuf,
    cache: PathBuf,
    logs: PathBuf,
}

impl AppPaths {
    /// Resolves the platform directories for glyphdeck.
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined.
    pub fn new() -> FileResult<Self> {
        let dirs = ProjectDirs::from("", "", "glyphdeck").ok_or_else(|| {
            FileError::new(
                FileErrorKind::NotFound,
                None,
                Some(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "no home directory to place glyphdeck files under",
                )),
            )
        })?;

        Ok(Self {
            config: dirs.config_dir().to_path_buf(),
            cache: dirs.cache_dir().to_path_buf(),
            logs: dirs.data_local_dir().join("logs"),
        })
    }

    /// Configuration directory; holds `config.toml`.
    pub fn config(&self) -> &Path {
        &self.config
    }

    /// Platform cache directory.
    pub fn cache(&self) -> &Path {
        &self.cache
    }

    /// Directory for the log file written by `glyphdeck --log`.
    pub fn logs(&self) -> &Path {
        &self.logs
    }

    /// Path of the default configuration file.
    pub fn config_file(&self) -> PathBuf {
        self.config.join("config.toml")
    }
}

/// The `cache` folder next to the running executable.
pub fn exe_cache_dir() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    Some(exe.parent()?.join(EXE_CACHE_DIR))
}

/// Default cache root: `cache` next to the executable when that location is
/// usable, otherwise the platform cache directory.
///
/// The chosen directory is created.
pub fn default_cache_root() -> FileResult<PathBuf> {
    if let Some(dir) = exe_cache_dir()
        && ensure_dir(&dir).is_ok()
    {
        return Ok(dir);
    }

    let dir = AppPaths::new()?.cache().to_path_buf();
    ensure_dir(&dir)?;
    Ok(dir)
}
