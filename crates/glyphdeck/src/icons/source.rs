//! Icon font sources and the capability to fetch their codepoint metadata.

use std::borrow::Borrow;
use std::fmt;

use glyphdeck_net::NetworkError;
use glyphdeck_net::http::HttpClient;
use serde::{Deserialize, Serialize};

use super::codepoints::{CodepointEntry, ParseError, parse_codepoints};
use super::weight::FontWeight;

/// Stable identifier of an icon font source, e.g. `material-symbols-outlined`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceId(String);

impl SourceId {
    /// Wraps an identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File-name-safe form of the identifier: path separators become `_`.
    pub fn file_stem(&self) -> String {
        self.0.replace(['/', '\\'], "_")
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for SourceId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SourceId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for SourceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Container format of a downloadable font file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontFormat {
    /// TrueType.
    Ttf,
    /// Web Open Font Format 2.
    Woff2,
}

impl FontFormat {
    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            FontFormat::Ttf => "ttf",
            FontFormat::Woff2 => "woff2",
        }
    }
}

/// A font file the user may install to preview a source's glyphs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontFile {
    pub url: String,
    pub format: FontFormat,
}

/// One icon font family/style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconFontSource {
    /// Stable identifier used in cache file names and session state.
    pub id: SourceId,
    /// Family name shown to users, e.g. "Material Symbols".
    pub display_name: String,
    /// Style shown next to the family, e.g. "Outlined".
    pub style_label: String,
    /// Name of the installed system font used to render the glyphs.
    pub font_family: String,
    /// Where the `name hex` codepoints file is downloaded from.
    pub codepoints_url: String,
    /// Downloadable font files, if any.
    pub font_files: Vec<FontFile>,
    /// Weights the font can render.
    pub available_weights: Vec<FontWeight>,
    /// Whether the source is enabled on first run.
    pub default_enabled: bool,
}

impl IconFontSource {
    /// Family and style, e.g. "Material Symbols Outlined".
    pub fn label(&self) -> String {
        if self.style_label.is_empty() {
            self.display_name.clone()
        } else {
            format!("{} {}", self.display_name, self.style_label)
        }
    }
}

/// Capability to obtain and decode codepoint metadata for one font source.
///
/// The cache calls `fetch` only when it has no usable copy on disk, and
/// persists the raw bytes only after `parse` accepted them.
pub trait CodepointSource: Send + Sync {
    /// Descriptor of the font this source serves.
    fn font(&self) -> &IconFontSource;

    /// Downloads the raw codepoints payload.
    fn fetch(&self) -> Result<Vec<u8>, NetworkError>;

    /// Decodes a raw payload into name-sorted entries.
    fn parse(&self, data: &[u8]) -> Result<Vec<CodepointEntry>, ParseError> {
        parse_codepoints(&self.font().id, data)
    }

    /// Shorthand for `self.font().id`.
    fn id(&self) -> &SourceId {
        &self.font().id
    }
}

/// A source whose codepoints file is served over HTTP.
#[derive(Debug, Clone)]
pub struct RemoteCodepointSource {
    font: IconFontSource,
    client: HttpClient,
}

impl RemoteCodepointSource {
    /// Fetches `font.codepoints_url` with `client`.
    pub fn new(font: IconFontSource, client: HttpClient) -> Self {
        Self { font, client }
    }
}

impl CodepointSource for RemoteCodepointSource {
    fn font(&self) -> &IconFontSource {
        &self.font
    }

    fn fetch(&self) -> Result<Vec<u8>, NetworkError> {
        let body = self.client.get_bytes_blocking(&self.font.codepoints_url)?;
        Ok(body.to_vec())
    }
}
