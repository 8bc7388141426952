//! In-memory index of the glyphs of the enabled sources.

use std::collections::BTreeSet;

use glyphdeck_core::PerfSpan;
use glyphdeck_core::logging::targets;

use super::cache::CacheError;
use super::codepoints::CodepointEntry;
use super::registry::SourceRegistry;
use super::source::{CodepointSource, SourceId};

/// The glyphs of one source, name-sorted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogGroup {
    pub source: SourceId,
    /// Family and style, e.g. "Material Symbols Rounded".
    pub label: String,
    pub style_label: String,
    pub font_family: String,
    pub entries: Vec<CodepointEntry>,
}

/// Glyphs grouped by source, groups in registration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IconCatalog {
    groups: Vec<CatalogGroup>,
}

/// A source left out of a catalog build.
#[derive(Debug)]
pub struct SkippedSource {
    pub source: SourceId,
    pub error: CacheError,
}

/// Result of [`IconCatalog::build`]: the catalog plus the sources that
/// could not be loaded.
#[derive(Debug, Default)]
pub struct CatalogBuild {
    pub catalog: IconCatalog,
    pub skipped: Vec<SkippedSource>,
}

impl CatalogBuild {
    /// Whether some enabled source is missing from the catalog.
    pub fn is_partial(&self) -> bool {
        !self.skipped.is_empty()
    }
}

impl IconCatalog {
    /// Builds a catalog from every registered source that is in `enabled`.
    ///
    /// `loader` supplies each source's entries, typically
    /// `|s| cache.load(s)` or `|s| cache.load_cached(s)`. A failing source is
    /// skipped and reported; ids in `enabled` that are not registered are
    /// ignored.
    pub fn build<L>(registry: &SourceRegistry, enabled: &BTreeSet<SourceId>, mut loader: L) -> CatalogBuild
    where
        L: FnMut(&dyn CodepointSource) -> Result<Vec<CodepointEntry>, CacheError>,
    {
        let _perf = PerfSpan::new("catalog_build");
        let mut build = CatalogBuild::default();

        for source in registry.iter().filter(|s| enabled.contains(s.id())) {
            let font = source.font();
            match loader(source.as_ref()) {
                Ok(entries) => build.catalog.groups.push(CatalogGroup {
                    source: font.id.clone(),
                    label: font.label(),
                    style_label: font.style_label.clone(),
                    font_family: font.font_family.clone(),
                    entries,
                }),
                Err(error) => {
                    tracing::debug!(target: targets::CATALOG, source = %font.id, %error, "source skipped");
                    build.skipped.push(SkippedSource {
                        source: font.id.clone(),
                        error,
                    });
                }
            }
        }

        tracing::debug!(
            target: targets::CATALOG,
            groups = build.catalog.groups.len(),
            entries = build.catalog.len(),
            skipped = build.skipped.len(),
            "catalog built"
        );
        build
    }

    /// Groups in registration order.
    pub fn groups(&self) -> &[CatalogGroup] {
        &self.groups
    }

    /// The group for `id`, if that source was loaded.
    pub fn group(&self, id: &str) -> Option<&CatalogGroup> {
        self.groups.iter().find(|g| g.source.as_str() == id)
    }

    /// Every entry, group by group.
    pub fn entries(&self) -> impl Iterator<Item = &CodepointEntry> {
        self.groups.iter().flat_map(|g| g.entries.iter())
    }

    /// `(source, name)` of every entry, in catalog order.
    pub fn entry_ids(&self) -> Vec<(SourceId, String)> {
        self.entries()
            .map(|e| (e.source().clone(), e.name().to_string()))
            .collect()
    }

    /// Total number of entries.
    pub fn len(&self) -> usize {
        self.groups.iter().map(|g| g.entries.len()).sum()
    }

    /// Whether the catalog holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
