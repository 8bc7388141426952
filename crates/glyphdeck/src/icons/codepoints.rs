//! Codepoint metadata: one `name hex` pair per line.
//!
//! ```text
//! # comment lines and blank lines are ignored
//! home e88a
//! search e8b6
//! ```

use std::fmt;

use super::source::SourceId;

/// One glyph of an icon font.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodepointEntry {
    name: String,
    codepoint: u32,
    character: char,
    display_name: String,
    source: SourceId,
    search_key: String,
}

impl CodepointEntry {
    /// Builds an entry, or `None` if `codepoint` is not a Unicode scalar value.
    pub fn new(source: SourceId, name: impl Into<String>, codepoint: u32) -> Option<Self> {
        let character = char::from_u32(codepoint)?;
        let name = name.into();
        let display_name = name.replace('_', " ");
        let search_key = display_name.to_lowercase();
        Some(Self {
            name,
            codepoint,
            character,
            display_name,
            source,
            search_key,
        })
    }

    /// Stable identifier, e.g. `arrow_back`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Numeric codepoint.
    pub fn codepoint(&self) -> u32 {
        self.codepoint
    }

    /// The glyph as a character.
    pub fn character(&self) -> char {
        self.character
    }

    /// Human-readable name, e.g. `arrow back`.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Source this glyph belongs to.
    pub fn source(&self) -> &SourceId {
        &self.source
    }

    /// Lower-cased display name used for matching.
    pub fn search_key(&self) -> &str {
        &self.search_key
    }

    /// Codepoint as lower-case hex, as it appears in the metadata file.
    pub fn hex(&self) -> String {
        format!("{:x}", self.codepoint)
    }
}

/// What was wrong with a codepoints payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// The line did not have exactly two fields.
    FieldCount(usize),
    /// The second field is not a hexadecimal number.
    InvalidHex(String),
    /// The number is not a Unicode scalar value (surrogate or too large).
    NotAScalar(u32),
    /// The payload is not valid UTF-8.
    NotUtf8,
    /// The payload contains no entries.
    Empty,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FieldCount(n) => write!(f, "expected 'name hex', found {n} fields"),
            Self::InvalidHex(s) => write!(f, "invalid hex codepoint '{s}'"),
            Self::NotAScalar(cp) => write!(f, "codepoint {cp:#x} is not a Unicode scalar value"),
            Self::NotUtf8 => write!(f, "data is not valid UTF-8"),
            Self::Empty => write!(f, "no codepoints found"),
        }
    }
}

/// Malformed codepoint metadata.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{source_id} line {line}: {kind}")]
pub struct ParseError {
    /// Source whose payload failed to parse.
    pub source_id: SourceId,
    /// 1-based line number; for an empty payload, the number of lines read.
    pub line: usize,
    /// What went wrong.
    pub kind: ParseErrorKind,
}

/// Parses a codepoints payload into entries sorted by name.
///
/// Blank lines and lines starting with `#` are skipped. Any other malformed
/// line fails the whole payload.
pub fn parse_codepoints(source: &SourceId, data: &[u8]) -> Result<Vec<CodepointEntry>, ParseError> {
    let error = |line, kind| ParseError {
        source_id: source.clone(),
        line,
        kind,
    };

    let text = std::str::from_utf8(data).map_err(|e| {
        let line = data[..e.valid_up_to()].iter().filter(|&&b| b == b'\n').count() + 1;
        error(line, ParseErrorKind::NotUtf8)
    })?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut entries = Vec::new();
    let mut line_count = 0;
    for (index, raw) in text.lines().enumerate() {
        line_count = index + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        let &[name, hex] = fields.as_slice() else {
            return Err(error(line_count, ParseErrorKind::FieldCount(fields.len())));
        };

        if hex.is_empty() || hex.len() > 8 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(error(line_count, ParseErrorKind::InvalidHex(hex.to_string())));
        }
        let codepoint = u32::from_str_radix(hex, 16)
            .map_err(|_| error(line_count, ParseErrorKind::InvalidHex(hex.to_string())))?;

        let entry = CodepointEntry::new(source.clone(), name, codepoint)
            .ok_or_else(|| error(line_count, ParseErrorKind::NotAScalar(codepoint)))?;
        entries.push(entry);
    }

    if entries.is_empty() {
        return Err(error(line_count, ParseErrorKind::Empty));
    }

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id() -> SourceId {
        SourceId::new("material-symbols-outlined")
    }

    #[test]
    fn test_parses_and_sorts() {
        let data = b"# Material Symbols\n\nsettings e8b8\nhome e88a\n  search   e8b6  \n";
        let entries = parse_codepoints(&id(), data).unwrap();

        let names: Vec<_> = entries.iter().map(|e| e.name()).collect();
        assert_eq!(names, ["home", "search", "settings"]);
        assert_eq!(entries[0].codepoint(), 0xe88a);
        assert_eq!(entries[0].character(), '\u{e88a}');
        assert_eq!(entries[0].source(), &id());
        assert_eq!(entries[0].hex(), "e88a");
    }

    #[test]
    fn test_display_name_and_search_key() {
        let entry = CodepointEntry::new(id(), "Arrow_Back", 0xe5c4).unwrap();
        assert_eq!(entry.display_name(), "Arrow Back");
        assert_eq!(entry.search_key(), "arrow back");
    }

    #[test]
    fn test_crlf_and_bom() {
        let data = "\u{feff}home e88a\r\nsearch e8b6\r\n".as_bytes();
        assert_eq!(parse_codepoints(&id(), data).unwrap().len(), 2);
    }

    #[test]
    fn test_field_count_error_has_line() {
        let err = parse_codepoints(&id(), b"home e88a\nbroken\n").unwrap_err();
        assert_eq!(err.line, 2);
        assert_eq!(err.kind, ParseErrorKind::FieldCount(1));
        assert_eq!(err.source_id, id());

        let err = parse_codepoints(&id(), b"a b c\n").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::FieldCount(3));
    }

    #[test]
    fn test_invalid_hex() {
        for bad in ["zz12", "+e88a", "0xe88a", "123456789"] {
            let data = format!("home {bad}\n");
            let err = parse_codepoints(&id(), data.as_bytes()).unwrap_err();
            assert_eq!(err.kind, ParseErrorKind::InvalidHex(bad.to_string()), "{bad}");
        }
    }

    #[test]
    fn test_surrogate_rejected() {
        let err = parse_codepoints(&id(), b"home e88a\nodd d800\n").unwrap_err();
        assert_eq!(err.line, 2);
        assert_eq!(err.kind, ParseErrorKind::NotAScalar(0xd800));
    }

    #[test]
    fn test_not_utf8() {
        let err = parse_codepoints(&id(), b"home e88a\n\xff\xfe e000\n").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::NotUtf8);
        assert_eq!(err.line, 2);
    }

    #[test]
    fn test_empty_payload() {
        let err = parse_codepoints(&id(), b"# only a comment\n\n").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::Empty);
        assert_eq!(err.line, 2);
        assert!(err.to_string().contains("no codepoints found"));
    }
}
