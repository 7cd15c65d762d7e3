/*!
 * Format adapters for translatable files.
 *
 * Both supported formats are reduced to an ordered list of
 * [`TranslationUnit`]s and rebuilt from that list after translation:
 *
 * - `srt`: numbered subtitle blocks, one unit per block
 * - `json`: `"key" : "value"` string pairs, one unit per occurrence
 */

use std::fmt;
use std::path::Path;

use crate::errors::FormatError;

pub mod json;
pub mod srt;

pub use self::json::JsonDocument;
pub use self::srt::{SrtDocument, SubtitleEntry};

/// Stable identity of a unit inside its file
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UnitId {
    /// Position of a subtitle block in the parsed file
    Index(usize),
    /// JSON key together with the occurrence position (keys may repeat)
    Key { key: String, position: usize },
}

impl UnitId {
    /// Position of the unit in parse order
    pub fn position(&self) -> usize {
        match self {
            Self::Index(position) => *position,
            Self::Key { position, .. } => *position,
        }
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(position) => write!(f, "#{}", position),
            Self::Key { key, position } => write!(f, "{}@{}", key, position),
        }
    }
}

/// One translatable piece of text
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationUnit {
    pub id: UnitId,
    pub source_text: String,
    pub translated_text: Option<String>,
}

impl TranslationUnit {
    pub fn new(id: UnitId, source_text: impl Into<String>) -> Self {
        Self {
            id,
            source_text: source_text.into(),
            translated_text: None,
        }
    }

    /// Record a translation; blank values fall back to the source text
    pub fn resolve(&mut self, translated: Option<&str>) {
        let value = match translated.map(str::trim) {
            Some(text) if !text.is_empty() => text.to_string(),
            _ => self.source_text.clone(),
        };
        self.translated_text = Some(value);
    }

    /// Text to write out: the translation when usable, otherwise the source
    pub fn output_text(&self) -> &str {
        match self.translated_text.as_deref() {
            Some(text) if !text.trim().is_empty() => text,
            _ => &self.source_text,
        }
    }
}

/// Supported input formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Srt,
    Json,
}

impl FileFormat {
    /// Detect the format from a file extension (case-insensitive)
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, FormatError> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "srt" => Ok(Self::Srt),
            "json" => Ok(Self::Json),
            _ => Err(FormatError::Unsupported(path.display().to_string())),
        }
    }
}

/// A parsed file: enough structure to rebuild it from translated units
#[derive(Debug, Clone)]
pub enum ParsedDocument {
    Srt(SrtDocument),
    Json(JsonDocument),
}

impl ParsedDocument {
    /// Parse raw text according to `format`
    pub fn parse(format: FileFormat, raw: &str) -> Self {
        match format {
            FileFormat::Srt => Self::Srt(srt::parse_srt(raw)),
            FileFormat::Json => Self::Json(json::parse_json(raw)),
        }
    }

    /// Blocks dropped during parsing because they could not be understood
    pub fn skipped_blocks(&self) -> usize {
        match self {
            Self::Srt(doc) => doc.skipped_blocks,
            Self::Json(_) => 0,
        }
    }

    /// Units in original order, none translated yet
    pub fn units(&self) -> Vec<TranslationUnit> {
        match self {
            Self::Srt(doc) => doc.units(),
            Self::Json(doc) => doc.units(),
        }
    }

    /// Rebuild the file text from (possibly a prefix of) the units
    pub fn render(&self, units: &[TranslationUnit]) -> String {
        match self {
            Self::Srt(doc) => srt::serialize_srt(doc, units),
            Self::Json(doc) => json::serialize_units(doc, units),
        }
    }
}
