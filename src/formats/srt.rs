use std::fmt;
use log::{debug, warn};

use super::{TranslationUnit, UnitId};

// @module: SubRip (.srt) parsing and rendering

// @struct: Single subtitle block
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleEntry {
    // @field: Index line, verbatim digits
    pub seq_num: String,

    // @field: Timestamp line, kept opaque
    pub timestamp: String,

    // @field: Subtitle text, lines joined by '\n'; may be empty
    pub text: String,
}

impl SubtitleEntry {
    pub fn new(seq_num: impl Into<String>, timestamp: impl Into<String>, text: impl Into<String>) -> Self {
        SubtitleEntry {
            seq_num: seq_num.into(),
            timestamp: timestamp.into(),
            text: text.into(),
        }
    }
}

impl fmt::Display for SubtitleEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.seq_num)?;
        writeln!(f, "{}", self.timestamp)?;
        writeln!(f, "{}", self.text)?;
        writeln!(f)
    }
}

/// Parsed subtitle file
#[derive(Debug, Clone, Default)]
pub struct SrtDocument {
    /// Blocks in file order
    pub entries: Vec<SubtitleEntry>,

    /// Index lines that were not followed by a timestamp
    pub skipped_blocks: usize,
}

impl SrtDocument {
    /// One unit per block, identified by block position
    pub fn units(&self) -> Vec<TranslationUnit> {
        self.entries
            .iter()
            .enumerate()
            .map(|(position, entry)| TranslationUnit::new(UnitId::Index(position), entry.text.clone()))
            .collect()
    }
}

fn is_index_line(line: &str) -> bool {
    !line.is_empty() && line.chars().all(|c| c.is_ascii_digit())
}

/// Parse raw SRT text into blocks.
///
/// A numeric line opens a block, the next line is its timestamp and the
/// non-blank lines after that are its text. Blocks without a timestamp are
/// skipped; blocks without text are kept with empty text.
pub fn parse_srt(raw: &str) -> SrtDocument {
    let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    let lines: Vec<&str> = raw.lines().collect();
    let mut entries = Vec::new();
    let mut skipped_blocks = 0;
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i].trim();
        if !is_index_line(line) {
            i += 1;
            continue;
        }

        let seq_num = line.to_string();
        i += 1;
        let timestamp = match lines.get(i).map(|l| l.trim()) {
            Some(ts) if !ts.is_empty() => ts.to_string(),
            _ => {
                debug!("Skipping subtitle {} without timestamp", seq_num);
                skipped_blocks += 1;
                continue;
            }
        };
        i += 1;

        let mut text_lines = Vec::new();
        while i < lines.len() && !lines[i].trim().is_empty() {
            text_lines.push(lines[i].trim());
            i += 1;
        }
        // blank separator
        i += 1;

        entries.push(SubtitleEntry::new(seq_num, timestamp, text_lines.join("\n")));
    }

    SrtDocument { entries, skipped_blocks }
}

/// Render units back into SRT text, in unit order.
///
/// Only the blocks named by `units` are written, so a prefix of the units
/// yields a partial file.
pub fn serialize_srt(document: &SrtDocument, units: &[TranslationUnit]) -> String {
    let mut output = String::new();
    for unit in units {
        let Some(entry) = document.entries.get(unit.id.position()) else {
            warn!("No subtitle block for unit {}, skipping", unit.id);
            continue;
        };
        let rendered = SubtitleEntry::new(entry.seq_num.as_str(), entry.timestamp.as_str(), unit.output_text());
        output.push_str(&rendered.to_string());
    }
    output
}
