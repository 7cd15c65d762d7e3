/*!
 * Patch-based handling of JSON localization files.
 *
 * Files are not parsed as JSON. Every `"key" : "value"` string pair is
 * located textually and later rewritten in place, so comments, ordering
 * and formatting survive untouched. Only flat string-valued pairs are
 * recognized: nested objects, arrays and non-string values pass through
 * as-is, and an escaped quote inside a value ends the match early.
 */

use std::collections::HashMap;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::{TranslationUnit, UnitId};

// Group 1: key, group 2: colon with its surrounding whitespace, group 3: value
static PAIR_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""([^"]+)"(\s*:\s*)"([^"]*)""#).unwrap()
});

/// Keys and values extracted from a JSON file, plus the original text
#[derive(Debug, Clone, Default)]
pub struct JsonDocument {
    /// Matched keys in file order; duplicates are kept
    pub keys: Vec<String>,
    /// Matched values, one per key
    pub values: Vec<String>,
    /// Full original file content
    pub original: String,
}

impl JsonDocument {
    /// One unit per matched pair
    pub fn units(&self) -> Vec<TranslationUnit> {
        self.keys
            .iter()
            .zip(&self.values)
            .enumerate()
            .map(|(position, (key, value))| {
                TranslationUnit::new(
                    UnitId::Key {
                        key: key.clone(),
                        position,
                    },
                    value.clone(),
                )
            })
            .collect()
    }
}

/// Extract every string pair from `raw`
pub fn parse_json(raw: &str) -> JsonDocument {
    let mut keys = Vec::new();
    let mut values = Vec::new();
    for caps in PAIR_REGEX.captures_iter(raw) {
        keys.push(caps[1].to_string());
        values.push(caps[3].to_string());
    }
    JsonDocument {
        keys,
        values,
        original: raw.to_string(),
    }
}

/// Rewrite matched pairs in `original` with the translated values.
///
/// An entry only counts as a change when its value differs from the source
/// value of that key: the value at the same position when `keys` lines up
/// with the file, otherwise any occurrence of the key. Unchanged entries
/// never touch the file. When several changes share a key, the last one
/// wins for every occurrence of that key.
pub fn serialize_json(keys: &[String], translated_values: &[String], original: &str) -> String {
    let source = parse_json(original);
    let mut changes = HashMap::new();
    for (position, (key, translated)) in keys.iter().zip(translated_values).enumerate() {
        let unchanged = match (source.keys.get(position), source.values.get(position)) {
            (Some(source_key), Some(source_value)) if source_key == key => source_value == translated,
            _ => source
                .keys
                .iter()
                .zip(&source.values)
                .any(|(source_key, source_value)| source_key == key && source_value == translated),
        };
        if !unchanged {
            changes.insert(key.as_str(), translated.as_str());
        }
    }
    patch_pairs(original, &changes)
}

/// Render a document from (possibly a prefix of) its units
pub fn serialize_units(document: &JsonDocument, units: &[TranslationUnit]) -> String {
    let mut changes = HashMap::new();
    for unit in units {
        let position = unit.id.position();
        let (Some(key), Some(source_value)) = (document.keys.get(position), document.values.get(position)) else {
            continue;
        };
        let translated = unit.output_text();
        if translated != source_value {
            changes.insert(key.as_str(), translated);
        }
    }
    patch_pairs(&document.original, &changes)
}

fn patch_pairs(original: &str, changes: &HashMap<&str, &str>) -> String {
    PAIR_REGEX
        .replace_all(original, |caps: &Captures| {
            let key = &caps[1];
            match changes.get(key) {
                Some(&translated) if translated != &caps[3] => {
                    format!("\"{}\"{}\"{}\"", key, &caps[2], escape_json_value(translated))
                }
                _ => caps[0].to_string(),
            }
        })
        .into_owned()
}

// Escape a value for a JSON string literal. Escape sequences that are
// already valid are kept; a stray backslash is doubled.
fn escape_json_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if starts_valid_escape(chars.clone()) {
                    escaped.push('\\');
                    if let Some(next) = chars.next() {
                        escaped.push(next);
                    }
                } else {
                    escaped.push_str("\\\\");
                }
            }
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            '\u{8}' => escaped.push_str("\\b"),
            '\u{c}' => escaped.push_str("\\f"),
            c if (c as u32) < 0x20 => escaped.push_str(&format!("\\u{:04x}", c as u32)),
            c => escaped.push(c),
        }
    }
    escaped
}

// `rest` is whatever follows a backslash
fn starts_valid_escape(mut rest: impl Iterator<Item = char>) -> bool {
    match rest.next() {
        Some('"' | '\\' | '/' | 'b' | 'f' | 'n' | 'r' | 't') => true,
        Some('u') => rest.take(4).filter(char::is_ascii_hexdigit).count() == 4,
        _ => false,
    }
}
