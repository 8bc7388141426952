//! Icon sources, the codepoint cache, the catalog and search.
//!
//! ```ignore
//! use glyphdeck::icons::{CodepointCache, IconCatalog, SourceRegistry, filter};
//!
//! let registry = SourceRegistry::material_symbols(&client);
//! let cache = CodepointCache::new(cache_root);
//! let enabled = registry.default_enabled();
//!
//! let build = IconCatalog::build(&registry, &enabled, |s| cache.load(s));
//! for entry in filter(&build.catalog, "arrow", &enabled) {
//!     println!("{} {}", entry.character(), entry.display_name());
//! }
//! ```

mod cache;
mod catalog;
mod codepoints;
mod filter;
mod registry;
mod source;
mod weight;

pub use cache::{CacheEntryInfo, CacheEntryMeta, CacheError, CodepointCache};
pub use catalog::{CatalogBuild, CatalogGroup, IconCatalog, SkippedSource};
pub use codepoints::{CodepointEntry, ParseError, ParseErrorKind, parse_codepoints};
pub use filter::{SearchQuery, filter};
pub use registry::{SourceRegistry, material_symbols_fonts};
pub use source::{
    CodepointSource, FontFile, FontFormat, IconFontSource, RemoteCodepointSource, SourceId,
};
pub use weight::{FontWeight, UnknownWeight, resolve_weight};
