//! The table of known icon sources.

use std::collections::BTreeSet;
use std::sync::Arc;

use glyphdeck_core::logging::targets;
use glyphdeck_net::http::HttpClient;

use super::source::{
    CodepointSource, FontFile, FontFormat, IconFontSource, RemoteCodepointSource, SourceId,
};
use super::weight::FontWeight;

const MATERIAL_BASE_URL: &str =
    "https://raw.githubusercontent.com/google/material-design-icons/master/variablefont/";

/// Axis suffix of the Material Symbols variable font file names (URL-encoded).
const MATERIAL_AXES: &str = "%5BFILL,GRAD,opsz,wght%5D";

/// Ordered, immutable table of icon sources.
///
/// Registration order is the display order of catalog groups and search
/// results. Build it once and share it behind an `Arc`.
#[derive(Default, Clone)]
pub struct SourceRegistry {
    sources: Vec<Arc<dyn CodepointSource>>,
}

impl SourceRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The three Material Symbols styles, fetched with `client`.
    pub fn material_symbols(client: &HttpClient) -> Self {
        material_symbols_fonts()
            .into_iter()
            .fold(Self::new(), |registry, font| {
                registry.with_source(RemoteCodepointSource::new(font, client.clone()))
            })
    }

    /// Adds a source, builder style. See [`register`](Self::register).
    #[must_use]
    pub fn with_source(mut self, source: impl CodepointSource + 'static) -> Self {
        self.register(Arc::new(source));
        self
    }

    /// Appends a source. A second source with an already registered id is
    /// ignored and `false` is returned.
    pub fn register(&mut self, source: Arc<dyn CodepointSource>) -> bool {
        if self.contains(source.id().as_str()) {
            tracing::warn!(target: targets::CATALOG, source = %source.id(), "duplicate source ignored");
            return false;
        }
        self.sources.push(source);
        true
    }

    /// Looks a source up by id.
    pub fn get(&self, id: &str) -> Option<&Arc<dyn CodepointSource>> {
        self.sources.iter().find(|s| s.id().as_str() == id)
    }

    /// Descriptor of the source with `id`.
    pub fn font(&self, id: &str) -> Option<&IconFontSource> {
        self.get(id).map(|s| s.font())
    }

    /// Whether a source with `id` is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Registration index of `id`.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.sources.iter().position(|s| s.id().as_str() == id)
    }

    /// Sources in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn CodepointSource>> {
        self.sources.iter()
    }

    /// Source ids in registration order.
    pub fn ids(&self) -> impl Iterator<Item = &SourceId> {
        self.sources.iter().map(|s| s.id())
    }

    /// Ids of the sources enabled on first run.
    pub fn default_enabled(&self) -> BTreeSet<SourceId> {
        self.sources
            .iter()
            .filter(|s| s.font().default_enabled)
            .map(|s| s.id().clone())
            .collect()
    }

    /// Number of registered sources.
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Whether no source is registered.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl std::fmt::Debug for SourceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.ids()).finish()
    }
}

/// Descriptors for Material Symbols Outlined, Rounded and Sharp.
pub fn material_symbols_fonts() -> Vec<IconFontSource> {
    ["Outlined", "Rounded", "Sharp"]
        .into_iter()
        .map(|style| {
            let file_name = format!("{MATERIAL_BASE_URL}MaterialSymbols{style}{MATERIAL_AXES}");
            IconFontSource {
                id: SourceId::new(format!("material-symbols-{}", style.to_lowercase())),
                display_name: "Material Symbols".to_string(),
                style_label: style.to_string(),
                font_family: format!("Material Symbols {style}"),
                codepoints_url: format!("{file_name}.codepoints"),
                font_files: [FontFormat::Ttf, FontFormat::Woff2]
                    .into_iter()
                    .map(|format| FontFile {
                        url: format!("{file_name}.{}", format.extension()),
                        format,
                    })
                    .collect(),
                available_weights: FontWeight::ALL.to_vec(),
                default_enabled: true,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_material_symbols_table() {
        let fonts = material_symbols_fonts();
        let ids: Vec<_> = fonts.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(
            ids,
            [
                "material-symbols-outlined",
                "material-symbols-rounded",
                "material-symbols-sharp"
            ]
        );

        let outlined = &fonts[0];
        assert_eq!(outlined.font_family, "Material Symbols Outlined");
        assert_eq!(
            outlined.codepoints_url,
            "https://raw.githubusercontent.com/google/material-design-icons/master/variablefont/\
             MaterialSymbolsOutlined%5BFILL,GRAD,opsz,wght%5D.codepoints"
        );
        assert_eq!(outlined.font_files.len(), 2);
        assert!(outlined.font_files[1].url.ends_with("wght%5D.woff2"));
        assert!(fonts.iter().all(|f| f.default_enabled));
    }

    #[test]
    fn test_registry_order_and_duplicates() {
        let client = HttpClient::new().unwrap();
        let mut registry = SourceRegistry::material_symbols(&client);
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.position("material-symbols-sharp"), Some(2));

        let duplicate = RemoteCodepointSource::new(material_symbols_fonts().remove(0), client);
        assert!(!registry.register(Arc::new(duplicate)));
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.default_enabled().len(), 3);
    }
}
