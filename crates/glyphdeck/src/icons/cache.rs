//! On-disk cache of codepoint metadata.
//!
//! Each source owns two files under the cache root:
//!
//! - `<id>.codepoints`: the raw payload exactly as downloaded
//! - `<id>.meta.json`: a sidecar recording where and when it was retrieved
//!
//! Entries never expire. A cached payload is reused until [`refresh`] or
//! [`remove`] is called (or the files are deleted by hand).
//!
//! ```ignore
//! use glyphdeck::icons::CodepointCache;
//!
//! let cache = CodepointCache::new("/home/me/.cache/glyphdeck");
//! let entries = cache.load(source.as_ref())?;   // network only on first use
//! let fresh = cache.refresh(source.as_ref())?;  // always re-downloads
//! ```
//!
//! [`refresh`]: CodepointCache::refresh
//! [`remove`]: CodepointCache::remove

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use glyphdeck_core::logging::targets;
use glyphdeck_net::NetworkError;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::codepoints::{CodepointEntry, ParseError};
use super::source::{CodepointSource, SourceId};
use crate::file::{self, FileError};

const CODEPOINTS_EXT: &str = "codepoints";
const META_EXT: &str = "meta.json";

/// Errors from loading or refreshing cached codepoints.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The download failed.
    #[error("failed to download codepoints for {source_id}: {error}")]
    Fetch {
        source_id: SourceId,
        #[source]
        error: NetworkError,
    },

    /// The payload (downloaded or cached) is malformed.
    #[error("malformed codepoints: {0}")]
    Parse(#[from] ParseError),

    /// Reading or writing the cache directory failed.
    #[error("cache I/O error: {0}")]
    Io(#[from] FileError),

    /// A cache-only load found no file.
    #[error("codepoints for {0} are not cached")]
    NotCached(SourceId),
}

impl CacheError {
    /// Whether this is [`CacheError::NotCached`].
    pub fn is_not_cached(&self) -> bool {
        matches!(self, CacheError::NotCached(_))
    }
}

/// Sidecar written next to each cached payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntryMeta {
    pub source: SourceId,
    pub url: String,
    pub retrieved_at: DateTime<Utc>,
    pub size: u64,
}

/// What is known about a cached payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntryInfo {
    /// Path of the `.codepoints` file.
    pub path: PathBuf,
    /// Payload size in bytes.
    pub size: u64,
    /// Retrieval time from the sidecar, else the file's modification time.
    pub retrieved_at: Option<DateTime<Utc>>,
    /// Download URL, when the sidecar is present.
    pub url: Option<String>,
    /// Whether a readable sidecar was found.
    pub has_sidecar: bool,
}

/// Disk cache of codepoint payloads with an in-process memo of parsed entries.
///
/// Safe to share between the UI thread and a download worker.
pub struct CodepointCache {
    root: PathBuf,
    parsed: Mutex<HashMap<SourceId, Arc<Vec<CodepointEntry>>>>,
}

impl CodepointCache {
    /// A cache rooted at `root`. The directory is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            parsed: Mutex::new(HashMap::new()),
        }
    }

    /// Cache root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the cached payload for `id`.
    pub fn codepoints_path(&self, id: &SourceId) -> PathBuf {
        self.root.join(format!("{}.{CODEPOINTS_EXT}", id.file_stem()))
    }

    /// Path of the sidecar for `id`.
    pub fn meta_path(&self, id: &SourceId) -> PathBuf {
        self.root.join(format!("{}.{META_EXT}", id.file_stem()))
    }

    /// Creates the cache root if needed. Idempotent.
    pub fn ensure_root(&self) -> Result<(), CacheError> {
        Ok(file::ensure_dir(&self.root)?)
    }

    /// Entries for `source`, downloading them only if nothing is cached.
    pub fn load(&self, source: &dyn CodepointSource) -> Result<Vec<CodepointEntry>, CacheError> {
        match self.load_cached(source) {
            Err(CacheError::NotCached(_)) => self.fetch_and_store(source),
            other => other,
        }
    }

    /// Re-downloads `source`, replacing any cached copy.
    ///
    /// The existing files are kept if the download or parse fails.
    pub fn refresh(&self, source: &dyn CodepointSource) -> Result<Vec<CodepointEntry>, CacheError> {
        self.fetch_and_store(source)
    }

    /// Entries for `source` from disk only; never touches the network.
    pub fn load_cached(
        &self,
        source: &dyn CodepointSource,
    ) -> Result<Vec<CodepointEntry>, CacheError> {
        let id = source.id();
        if let Some(entries) = self.parsed.lock().get(id) {
            return Ok(entries.as_ref().clone());
        }

        let path = self.codepoints_path(id);
        let data = match file::read_bytes(&path) {
            Ok(data) => data,
            Err(e) if e.is_not_found() => return Err(CacheError::NotCached(id.clone())),
            Err(e) => return Err(e.into()),
        };

        let entries = source.parse(&data)?;
        tracing::debug!(target: targets::CACHE, source = %id, count = entries.len(), "loaded cached codepoints");
        self.remember(id, &entries);
        Ok(entries)
    }

    /// Whether a payload for `id` exists on disk.
    pub fn is_cached(&self, id: &SourceId) -> bool {
        self.codepoints_path(id).is_file()
    }

    /// Metadata of the cached payload for `id`, or `None` if not cached.
    ///
    /// Falls back to the payload's modification time when the sidecar is
    /// missing or unreadable.
    pub fn entry_info(&self, id: &SourceId) -> Result<Option<CacheEntryInfo>, CacheError> {
        let path = self.codepoints_path(id);
        let metadata = match std::fs::metadata(&path) {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(FileError::from_io(e, &path).into()),
        };

        let meta_path = self.meta_path(id);
        let info = match file::read_json::<CacheEntryMeta>(&meta_path) {
            Ok(meta) => CacheEntryInfo {
                path,
                size: metadata.len(),
                retrieved_at: Some(meta.retrieved_at),
                url: Some(meta.url),
                has_sidecar: true,
            },
            Err(e) => {
                if !e.is_not_found() {
                    tracing::warn!(target: targets::CACHE, source = %id, error = %e, "ignoring unreadable cache sidecar");
                }
                CacheEntryInfo {
                    retrieved_at: file::modified_time(&path).ok().map(DateTime::<Utc>::from),
                    path,
                    size: metadata.len(),
                    url: None,
                    has_sidecar: false,
                }
            }
        };
        Ok(Some(info))
    }

    /// Number of glyphs `source` decodes from its cached payload, or 0 if
    /// nothing is cached.
    pub fn cached_glyph_count(&self, source: &dyn CodepointSource) -> Result<usize, CacheError> {
        if let Some(entries) = self.parsed.lock().get(source.id()) {
            return Ok(entries.len());
        }
        match self.load_cached(source) {
            Ok(entries) => Ok(entries.len()),
            Err(CacheError::NotCached(_)) => Ok(0),
            Err(e) => Err(e),
        }
    }

    /// Deletes the cached payload and sidecar for `id`.
    ///
    /// Returns whether a payload existed.
    pub fn remove(&self, id: &SourceId) -> Result<bool, CacheError> {
        self.parsed.lock().remove(id);
        let existed = file::remove_if_exists(self.codepoints_path(id))?;
        file::remove_if_exists(self.meta_path(id))?;
        if existed {
            tracing::info!(target: targets::CACHE, source = %id, "removed cached codepoints");
        }
        Ok(existed)
    }

    fn fetch_and_store(
        &self,
        source: &dyn CodepointSource,
    ) -> Result<Vec<CodepointEntry>, CacheError> {
        let font = source.font();
        let id = &font.id;
        tracing::info!(target: targets::CACHE, source = %id, url = %font.codepoints_url, "downloading codepoints");

        let data = source.fetch().map_err(|error| CacheError::Fetch {
            source_id: id.clone(),
            error,
        })?;

        // Parse before writing: a bad payload must not replace a good one
        let entries = source.parse(&data)?;

        self.ensure_root()?;
        file::atomic_write(self.codepoints_path(id), |w| w.write_all(&data))?;

        let meta = CacheEntryMeta {
            source: id.clone(),
            url: font.codepoints_url.clone(),
            retrieved_at: Utc::now(),
            size: data.len() as u64,
        };
        if let Err(e) = file::write_json(self.meta_path(id), &meta) {
            // The payload alone is still usable
            tracing::warn!(target: targets::CACHE, source = %id, error = %e, "failed to write cache sidecar");
        }

        tracing::info!(target: targets::CACHE, source = %id, count = entries.len(), size = data.len(), "cached codepoints");
        self.remember(id, &entries);
        Ok(entries)
    }

    fn remember(&self, id: &SourceId, entries: &[CodepointEntry]) {
        self.parsed
            .lock()
            .insert(id.clone(), Arc::new(entries.to_vec()));
    }
}

impl std::fmt::Debug for CodepointCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodepointCache")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}
