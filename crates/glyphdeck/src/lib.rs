//! glyphdeck - icon picker core.
//!
//! Downloads and caches glyph codepoint tables for icon fonts (Material
//! Symbols out of the box), merges them into a searchable catalog and keeps
//! the picker's selection state across sessions. A host dialog drives a
//! [`PickerSession`] and receives the chosen glyph through [`GlyphHost`].
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use glyphdeck::{GlyphdeckConfig, PickerSession, SourceRegistry};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = GlyphdeckConfig::load();
//!     let registry = Arc::new(SourceRegistry::material_symbols(&config.http_client()?));
//!
//!     let mut session = PickerSession::open(registry, &config)?;
//!     session.set_query("arrow");
//!     for entry in session.visible().iter().take(10) {
//!         println!("{} U+{}", entry.display_name(), entry.hex());
//!     }
//!     session.close();
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod file;
pub mod icons;
pub mod picker;
pub mod state;

pub use glyphdeck_core::{CoreError, LogConfig, PerfSpan, logging};

pub use config::{ConfigError, GlyphdeckConfig, LayerConfig};
pub use icons::{
    CacheError, CodepointCache, CodepointEntry, CodepointSource, FontWeight, IconCatalog, IconFontSource,
    SourceId, SourceRegistry, filter,
};
pub use picker::{GlyphHost, GlyphInsertion, HostError, InsertError, OpenError, PickerSession, SessionStatus};
pub use state::{SessionState, StateError, StateStore};
