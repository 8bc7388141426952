//! The picker session: the state a host dialog drives with explicit calls.
//!
//! A host (a PCB editor plugin, the CLI, a test) owns one [`PickerSession`]
//! on its UI thread and forwards user actions to it:
//!
//! ```ignore
//! let mut session = PickerSession::open(registry, &config)?;
//!
//! // on every keystroke / toggle
//! session.set_query(&search_box_text);
//! let rows = session.visible();
//! status_bar.set_text(&session.status().to_string());
//!
//! // on a timer
//! for failure in session.poll() {
//!     show_warning(&failure.to_string());
//! }
//!
//! // on "Add"
//! session.insert(selected_row, &mut board)?;
//! session.close();
//! ```
//!
//! Downloads run on a background [`Worker`]; their results are applied only
//! inside [`PickerSession::poll`], so catalog updates and user input never
//! interleave.

use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use glyphdeck_core::logging::targets;
use glyphdeck_core::{CoreError, Worker, WorkerBuilder};

use crate::config::{GlyphdeckConfig, LayerConfig};
use crate::file::FileError;
use crate::icons::{
    CacheError, CodepointCache, CodepointEntry, FontWeight, IconCatalog, SkippedSource, SourceId,
    SourceRegistry, filter, resolve_weight,
};
use crate::state::{SessionState, StateStore, clamp_font_size_mm};

/// What the host is asked to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlyphInsertion {
    /// The glyph to place as text.
    pub character: char,
    /// Glyph name, e.g. `arrow_back`.
    pub name: String,
    /// Target layer id.
    pub layer: String,
    /// System font family that renders the glyph.
    pub font_family: String,
    /// Weight, already resolved against what the font offers.
    pub weight: FontWeight,
    /// Text height in millimetres.
    pub size_mm: u32,
}

/// Failure reported by the host while inserting.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct HostError {
    message: String,
}

impl HostError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// The host document API, as far as the picker needs it.
pub trait GlyphHost {
    /// Creates a text item for `glyph` (and typically starts an interactive
    /// move so the user can place it).
    fn insert_glyph(&mut self, glyph: &GlyphInsertion) -> Result<(), HostError>;
}

/// Why an insert was refused.
#[derive(Debug, thiserror::Error)]
pub enum InsertError {
    #[error("no icon set is enabled")]
    NoEnabledSources,

    #[error("row {index} is not visible ({visible} rows shown)")]
    NoSuchRow { index: usize, visible: usize },

    #[error("host rejected the glyph: {0}")]
    Host(#[from] HostError),
}

/// Why a session could not be opened.
#[derive(Debug, thiserror::Error)]
pub enum OpenError {
    #[error("cache directory unavailable: {0}")]
    CacheRoot(#[from] FileError),

    #[error("download worker unavailable: {0}")]
    Worker(#[from] CoreError),
}

/// One-line summary for the host's status bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Nothing is enabled, so nothing can be shown.
    NoSourcesEnabled,
    /// Downloads are running and nothing is shown yet.
    Loading { pending: usize },
    /// Every enabled source failed to load.
    Unavailable,
    /// `count` rows are visible.
    Showing { count: usize },
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSourcesEnabled => write!(f, "Enable at least one icon set to browse icons"),
            Self::Loading { pending: 1 } => write!(f, "Downloading icon metadata for 1 icon set..."),
            Self::Loading { pending } => {
                write!(f, "Downloading icon metadata for {pending} icon sets...")
            }
            Self::Unavailable => write!(f, "Unable to load icon metadata. Check network access."),
            Self::Showing { count: 1 } => write!(f, "Showing 1 icon"),
            Self::Showing { count } => write!(f, "Showing {count} icons"),
        }
    }
}

/// Completion of one background download.
struct FetchOutcome {
    source: SourceId,
    result: Result<usize, CacheError>,
}

/// UI-adapter core of the icon picker.
pub struct PickerSession {
    registry: Arc<SourceRegistry>,
    cache: Arc<CodepointCache>,
    store: StateStore,
    layers: Vec<LayerConfig>,
    state: SessionState,
    catalog: IconCatalog,
    /// Sources with a download queued or running.
    pending: BTreeSet<SourceId>,
    /// Sources whose last load failed, with the reason.
    failures: Vec<SkippedSource>,
    worker: Worker<FetchOutcome>,
}

impl PickerSession {
    /// Opens a session using the configured cache root for both the cache and
    /// the state file.
    pub fn open(registry: Arc<SourceRegistry>, config: &GlyphdeckConfig) -> Result<Self, OpenError> {
        let root = config.resolve_cache_root()?;
        Self::open_in(registry, config, root)
    }

    /// Opens a session whose cache and state file live in `root`.
    ///
    /// Restores the saved state, builds the catalog from whatever is already
    /// cached and queues downloads for enabled sources that are not.
    pub fn open_in(
        registry: Arc<SourceRegistry>,
        config: &GlyphdeckConfig,
        root: impl Into<PathBuf>,
    ) -> Result<Self, OpenError> {
        let root = root.into();
        let store = StateStore::new(&root, &registry, config);
        let worker = WorkerBuilder::new().name("glyphdeck-fetch").build()?;

        let mut session = Self {
            cache: Arc::new(CodepointCache::new(root)),
            state: store.load(),
            store,
            registry,
            layers: config.layers.clone(),
            catalog: IconCatalog::default(),
            pending: BTreeSet::new(),
            failures: Vec::new(),
            worker,
        };

        session.rebuild();
        let missing: Vec<SourceId> = session
            .enabled_registered()
            .filter(|id| !session.cache.is_cached(id))
            .cloned()
            .collect();
        for id in missing {
            session.schedule_fetch(&id, false);
        }

        tracing::info!(
            target: targets::PICKER,
            enabled = session.state.enabled_sources.len(),
            entries = session.catalog.len(),
            pending = session.pending.len(),
            "picker session opened"
        );
        Ok(session)
    }

    /// Current state.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Current catalog.
    pub fn catalog(&self) -> &IconCatalog {
        &self.catalog
    }

    /// The registry the session was opened with.
    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    /// Layers the host should offer.
    pub fn layers(&self) -> &[LayerConfig] {
        &self.layers
    }

    /// The codepoint cache used by this session.
    pub fn cache(&self) -> &CodepointCache {
        &self.cache
    }

    /// Sources whose last load failed.
    pub fn failures(&self) -> &[SkippedSource] {
        &self.failures
    }

    /// Whether downloads are queued or running.
    pub fn is_loading(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Sets the search text.
    pub fn set_query(&mut self, query: &str) {
        self.state.query = query.to_string();
    }

    /// Enables or disables a source. Returns `false` for unknown ids.
    ///
    /// Enabling a source that is not cached queues its download.
    pub fn set_source_enabled(&mut self, id: &str, enabled: bool) -> bool {
        let Some(source_id) = self.registry.get(id).map(|s| s.id().clone()) else {
            return false;
        };

        let changed = if enabled {
            self.state.enabled_sources.insert(source_id.clone())
        } else {
            self.state.enabled_sources.remove(&source_id)
        };
        if changed {
            self.rebuild();
            if enabled && !self.cache.is_cached(&source_id) {
                self.schedule_fetch(&source_id, false);
            }
        }
        true
    }

    /// Selects the target layer. Returns `false` if it is not configured.
    pub fn set_layer(&mut self, layer: &str) -> bool {
        if !self.layers.iter().any(|l| l.id == layer) {
            return false;
        }
        self.state.layer = layer.to_string();
        true
    }

    /// Sets the glyph height, clamped into the allowed range.
    pub fn set_font_size_mm(&mut self, size: i64) -> u32 {
        self.state.font_size_mm = clamp_font_size_mm(size);
        self.state.font_size_mm
    }

    /// Sets the preferred weight.
    pub fn set_font_weight(&mut self, weight: FontWeight) {
        self.state.font_weight = weight;
    }

    /// 1-based position of the preferred weight on a thin-to-bold slider.
    pub fn font_weight_position(&self) -> usize {
        FontWeight::position_for_name(self.state.font_weight.name())
    }

    /// Sets the preferred weight from a slider position, clamped into range.
    pub fn set_font_weight_position(&mut self, position: i64) -> FontWeight {
        let name = FontWeight::name_for_position(position);
        self.state.font_weight = FontWeight::from_name(name).unwrap_or_default();
        self.state.font_weight
    }

    /// Rows to show for the current query and enabled sources.
    pub fn visible(&self) -> Vec<&CodepointEntry> {
        filter(&self.catalog, &self.state.query, &self.state.enabled_sources)
    }

    /// Status line for the host.
    pub fn status(&self) -> SessionStatus {
        if self.state.enabled_sources.is_empty() {
            return SessionStatus::NoSourcesEnabled;
        }
        let count = self.visible().len();
        if count == 0 && self.is_loading() {
            SessionStatus::Loading {
                pending: self.pending.len(),
            }
        } else if self.catalog.is_empty() && !self.failures.is_empty() {
            SessionStatus::Unavailable
        } else {
            SessionStatus::Showing { count }
        }
    }

    /// Applies finished downloads and rebuilds the catalog.
    ///
    /// Returns the downloads that failed since the last call.
    pub fn poll(&mut self) -> &[SkippedSource] {
        let outcomes = self.worker.drain();
        if outcomes.is_empty() {
            return &[];
        }

        let mut failed = Vec::new();
        for outcome in outcomes {
            self.pending.remove(&outcome.source);
            match outcome.result {
                Ok(count) => {
                    tracing::debug!(target: targets::PICKER, source = %outcome.source, count, "download applied");
                }
                Err(error) => {
                    tracing::warn!(target: targets::PICKER, source = %outcome.source, %error, "download failed");
                    failed.push(SkippedSource {
                        source: outcome.source,
                        error,
                    });
                }
            }
        }

        self.rebuild();
        self.failures
            .retain(|f| !failed.iter().any(|n| n.source == f.source));
        let start = self.failures.len();
        self.failures.extend(failed);
        &self.failures[start..]
    }

    /// Queues a forced re-download of every enabled source.
    ///
    /// Returns how many downloads were queued.
    pub fn refresh_all(&mut self) -> usize {
        let ids: Vec<SourceId> = self.enabled_registered().cloned().collect();
        ids.iter().filter(|id| self.schedule_fetch(id, true)).count()
    }

    /// Hands the visible row at `index` to the host, then saves the state.
    pub fn insert(&mut self, index: usize, host: &mut dyn GlyphHost) -> Result<GlyphInsertion, InsertError> {
        if self.state.enabled_sources.is_empty() {
            return Err(InsertError::NoEnabledSources);
        }

        let visible = self.visible();
        let entry = visible.get(index).ok_or(InsertError::NoSuchRow {
            index,
            visible: visible.len(),
        })?;

        let font = self.registry.font(entry.source().as_str());
        let insertion = GlyphInsertion {
            character: entry.character(),
            name: entry.name().to_string(),
            layer: self.state.layer.clone(),
            font_family: font.map(|f| f.font_family.clone()).unwrap_or_default(),
            weight: resolve_weight(
                self.state.font_weight,
                font.map(|f| f.available_weights.as_slice()).unwrap_or_default(),
            ),
            size_mm: self.state.font_size_mm,
        };

        host.insert_glyph(&insertion)?;
        tracing::info!(target: targets::PICKER, glyph = %insertion.name, layer = %insertion.layer, "glyph inserted");

        if let Err(e) = self.store.save(&self.state) {
            tracing::warn!(target: targets::PICKER, error = %e, "failed to save state after insert");
        }
        Ok(insertion)
    }

    /// Saves the state and ends the session.
    ///
    /// Downloads still running are not awaited; their results are dropped.
    pub fn close(self) {
        if let Err(e) = self.store.save(&self.state) {
            tracing::warn!(target: targets::PICKER, error = %e, "failed to save state on close");
        }
        self.worker.abandon();
        tracing::info!(target: targets::PICKER, abandoned = self.pending.len(), "picker session closed");
    }

    fn enabled_registered(&self) -> impl Iterator<Item = &SourceId> {
        self.registry
            .ids()
            .filter(|id| self.state.enabled_sources.contains(*id))
    }

    /// Rebuilds the catalog from cached files only.
    fn rebuild(&mut self) {
        let cache = &self.cache;
        let build = IconCatalog::build(&self.registry, &self.state.enabled_sources, |source| {
            cache.load_cached(source)
        });
        self.catalog = build.catalog;

        let mut failures: Vec<SkippedSource> = build
            .skipped
            .into_iter()
            .filter(|s| !s.error.is_not_cached())
            .collect();
        // A failed download leaves no file, so a cache-only build cannot see it
        let carried: Vec<SkippedSource> = std::mem::take(&mut self.failures)
            .into_iter()
            .filter(|f| {
                self.state.enabled_sources.contains(&f.source)
                    && self.catalog.group(f.source.as_str()).is_none()
                    && !failures.iter().any(|n| n.source == f.source)
            })
            .collect();
        failures.extend(carried);
        self.failures = failures;
    }

    /// Queues a download unless one is already pending for `id`.
    fn schedule_fetch(&mut self, id: &SourceId, force: bool) -> bool {
        if self.pending.contains(id) {
            return false;
        }
        let Some(source) = self.registry.get(id.as_str()).cloned() else {
            return false;
        };

        let cache = Arc::clone(&self.cache);
        let source_id = id.clone();
        let sent = self.worker.send(move || {
            let result = if force {
                cache.refresh(source.as_ref())
            } else {
                cache.load(source.as_ref())
            };
            FetchOutcome {
                source: source_id,
                result: result.map(|entries| entries.len()),
            }
        });

        match sent {
            Ok(()) => {
                self.pending.insert(id.clone());
                true
            }
            Err(e) => {
                tracing::warn!(target: targets::PICKER, source = %id, error = %e, "could not queue download");
                false
            }
        }
    }
}

impl fmt::Debug for PickerSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PickerSession")
            .field("state", &self.state)
            .field("entries", &self.catalog.len())
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}
