//! Search-as-you-type filtering over an [`IconCatalog`].

use std::collections::BTreeSet;

use glyphdeck_core::PerfSpan;
use glyphdeck_core::logging::targets;

use super::catalog::IconCatalog;
use super::codepoints::CodepointEntry;
use super::source::SourceId;

/// A normalized search query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    needle: String,
}

impl SearchQuery {
    /// Trims and lower-cases `query`.
    pub fn new(query: &str) -> Self {
        Self {
            needle: query.trim().to_lowercase(),
        }
    }

    /// Whether the query matches everything.
    pub fn is_empty(&self) -> bool {
        self.needle.is_empty()
    }

    /// Whether `entry`'s display name contains the query, ignoring case.
    pub fn matches(&self, entry: &CodepointEntry) -> bool {
        entry.search_key().contains(&self.needle)
    }
}

/// Entries of enabled sources whose display name contains `query`.
///
/// Results keep catalog order: source registration order, then name order
/// within a source. There is no relevance ranking.
pub fn filter<'a>(
    catalog: &'a IconCatalog,
    query: &str,
    enabled: &BTreeSet<SourceId>,
) -> Vec<&'a CodepointEntry> {
    let _perf = PerfSpan::new("filter");
    let query = SearchQuery::new(query);

    let results: Vec<_> = catalog
        .groups()
        .iter()
        .filter(|g| enabled.contains(&g.source))
        .flat_map(|g| g.entries.iter())
        .filter(|e| query.matches(e))
        .collect();

    tracing::trace!(target: targets::FILTER, query = %query.needle, matches = results.len(), "filtered");
    results
}
