//! Persisted session state: what the picker showed when it was last closed.
//!
//! The file is small JSON written atomically:
//!
//! ```json
//! {
//!   "query": "arrow",
//!   "enabled_sources": ["material-symbols-outlined"],
//!   "layer": "F.SilkS",
//!   "font_size_mm": 5,
//!   "font_weight": "Regular"
//! }
//! ```

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use glyphdeck_core::logging::targets;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::config::GlyphdeckConfig;
use crate::file::{self, FileError, FileErrorKind};
use crate::icons::{FontWeight, SourceId, SourceRegistry};

/// Name of the state file inside the state directory.
pub const STATE_FILE_NAME: &str = "glyphdeck_state.json";

/// Smallest glyph height, in millimetres.
pub const FONT_SIZE_MIN_MM: u32 = 1;
/// Largest glyph height, in millimetres.
pub const FONT_SIZE_MAX_MM: u32 = 50;
/// Glyph height used on first run.
pub const DEFAULT_FONT_SIZE_MM: u32 = 5;

/// Clamps a requested size into `FONT_SIZE_MIN_MM..=FONT_SIZE_MAX_MM`.
pub fn clamp_font_size_mm(size: i64) -> u32 {
    size.clamp(FONT_SIZE_MIN_MM as i64, FONT_SIZE_MAX_MM as i64) as u32
}

/// UI selection state that survives restarts.
///
/// An empty `enabled_sources` set is valid; the picker then shows nothing
/// and refuses to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub query: String,
    pub enabled_sources: BTreeSet<SourceId>,
    pub layer: String,
    pub font_size_mm: u32,
    pub font_weight: FontWeight,
}

/// On-disk shape. Every field is optional and read on its own, so a
/// missing or mistyped field in an older or hand-edited file only resets
/// that field.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredState {
    #[serde(default, deserialize_with = "lenient")]
    query: Option<String>,
    #[serde(default, deserialize_with = "string_items")]
    enabled_sources: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient")]
    layer: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    font_size_mm: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    font_weight: Option<String>,
}

/// Treats a value of the wrong JSON type as absent.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).ok())
}

/// The string elements of an array; anything else is absent.
fn string_items<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Array(items) = Value::deserialize(deserializer)? else {
        return Ok(None);
    };
    Ok(Some(
        items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(id) => Some(id),
                _ => None,
            })
            .collect(),
    ))
}

/// Errors from reading or writing the state file.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("no saved state at {}", .0.display())]
    NotFound(PathBuf),

    #[error("corrupt state file: {0}")]
    Corrupt(#[source] FileError),

    #[error("state file I/O error: {0}")]
    Io(#[source] FileError),
}

impl From<FileError> for StateError {
    fn from(err: FileError) -> Self {
        match err.kind() {
            FileErrorKind::NotFound => {
                let path = err.path().map(Path::to_path_buf).unwrap_or_default();
                StateError::NotFound(path)
            }
            FileErrorKind::InvalidData => StateError::Corrupt(err),
            _ => StateError::Io(err),
        }
    }
}

/// Reads and writes [`SessionState`] at a fixed path.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
    known_sources: Vec<SourceId>,
    default_sources: BTreeSet<SourceId>,
    layers: Vec<String>,
    default_layer: String,
}

impl StateStore {
    /// A store for `<dir>/glyphdeck_state.json`, validating against the
    /// registered sources and configured layers.
    pub fn new(dir: impl AsRef<Path>, registry: &SourceRegistry, config: &GlyphdeckConfig) -> Self {
        Self {
            path: dir.as_ref().join(STATE_FILE_NAME),
            known_sources: registry.ids().cloned().collect(),
            default_sources: registry.default_enabled(),
            layers: config.layers.iter().map(|l| l.id.clone()).collect(),
            default_layer: config.default_layer.clone(),
        }
    }

    /// Path of the state file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// First-run state.
    pub fn defaults(&self) -> SessionState {
        SessionState {
            query: String::new(),
            enabled_sources: self.default_sources.clone(),
            layer: self.default_layer.clone(),
            font_size_mm: DEFAULT_FONT_SIZE_MM,
            font_weight: FontWeight::default(),
        }
    }

    /// Loads the saved state, falling back to [`defaults`](Self::defaults).
    ///
    /// A missing file is normal on first run; an unreadable or corrupt one
    /// is logged and ignored.
    pub fn load(&self) -> SessionState {
        match self.try_load() {
            Ok(state) => state,
            Err(StateError::NotFound(_)) => {
                tracing::debug!(target: targets::STATE, path = %self.path.display(), "no saved state, using defaults");
                self.defaults()
            }
            Err(e) => {
                tracing::warn!(target: targets::STATE, error = %e, "discarding saved state");
                self.defaults()
            }
        }
    }

    /// Loads the saved state, reporting why it could not be read.
    ///
    /// Values that are merely out of range are corrected rather than
    /// rejected: unknown sources are dropped, an unknown layer or weight
    /// falls back to the default and the font size is clamped.
    pub fn try_load(&self) -> Result<SessionState, StateError> {
        let stored: StoredState = file::read_json(&self.path)?;
        Ok(self.sanitize(stored))
    }

    /// Writes `state` atomically, creating the parent directory.
    pub fn save(&self, state: &SessionState) -> Result<(), StateError> {
        let stored = StoredState {
            query: Some(state.query.clone()),
            enabled_sources: Some(state.enabled_sources.iter().map(|id| id.to_string()).collect()),
            layer: Some(state.layer.clone()),
            font_size_mm: Some(i64::from(state.font_size_mm)),
            font_weight: Some(state.font_weight.name().to_string()),
        };
        file::write_json(&self.path, &stored)?;
        tracing::debug!(target: targets::STATE, path = %self.path.display(), "state saved");
        Ok(())
    }

    /// Deletes the state file. Returns whether it existed.
    pub fn reset(&self) -> Result<bool, StateError> {
        Ok(file::remove_if_exists(&self.path)?)
    }

    fn sanitize(&self, stored: StoredState) -> SessionState {
        let defaults = self.defaults();

        let enabled_sources = match stored.enabled_sources {
            Some(ids) => ids
                .into_iter()
                .filter(|id| {
                    let known = self.known_sources.iter().any(|k| k.as_str() == id);
                    if !known {
                        tracing::debug!(target: targets::STATE, source = %id, "dropping unknown source");
                    }
                    known
                })
                .map(SourceId::from)
                .collect(),
            None => defaults.enabled_sources,
        };

        let layer = match stored.layer {
            Some(layer) if self.layers.contains(&layer) => layer,
            _ => defaults.layer,
        };

        SessionState {
            query: stored.query.unwrap_or_default(),
            enabled_sources,
            layer,
            font_size_mm: stored
                .font_size_mm
                .map_or(defaults.font_size_mm, clamp_font_size_mm),
            font_weight: stored
                .font_weight
                .as_deref()
                .and_then(FontWeight::from_name)
                .unwrap_or(defaults.font_weight),
        }
    }
}
