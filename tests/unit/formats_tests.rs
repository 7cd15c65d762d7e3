/*!
 * Tests for SRT and JSON format handling
 */

use strans::formats::json::{parse_json, serialize_json};
use strans::formats::srt::parse_srt;
use strans::formats::{FileFormat, ParsedDocument, UnitId};
use crate::common::SAMPLE_SRT;

/// Test that SRT blocks become units in order
#[test]
fn test_parse_srt_withThreeBlocks_shouldYieldThreeUnits() {
    let units = ParsedDocument::parse(FileFormat::Srt, SAMPLE_SRT).units();

    assert_eq!(units.len(), 3);
    assert_eq!(units[0].id, UnitId::Index(0));
    assert_eq!(units[2].source_text, "For testing purposes.");
}

/// Test that rendering a translated SRT keeps index and timestamp lines
#[test]
fn test_render_srt_withTranslations_shouldKeepTimingLines() {
    let document = ParsedDocument::parse(FileFormat::Srt, SAMPLE_SRT);
    let mut units = document.units();
    for (i, unit) in units.iter_mut().enumerate() {
        unit.resolve(Some(&format!("Превод {}", i + 1)));
    }

    let output = document.render(&units);

    assert!(output.starts_with("1\n00:00:01,000 --> 00:00:04,000\nПревод 1\n\n"));
    assert!(output.contains("3\n00:00:10,000 --> 00:00:14,000\nПревод 3\n\n"));
    assert_eq!(parse_srt(&output).entries.len(), 3);
}

/// Test that index lines with leading zeros are preserved verbatim
#[test]
fn test_parse_srt_withPaddedIndex_shouldKeepIndexText() {
    let doc = parse_srt("007\n00:00:01,000 --> 00:00:02,000\nBond\n");
    assert_eq!(doc.entries[0].seq_num, "007");
}

/// Test the JSON key/value scenario end to end
#[test]
fn test_json_roundtrip_withTranslatedValues_shouldPatchInPlace() {
    let raw = r#"{"a":"hello","b":"world"}"#;
    let document = ParsedDocument::parse(FileFormat::Json, raw);
    let mut units = document.units();
    assert_eq!(units.len(), 2);
    units[0].resolve(Some("bonjour"));
    units[1].resolve(Some("monde"));

    assert_eq!(document.render(&units), r#"{"a":"bonjour","b":"monde"}"#);
}

/// Test that a JSON file without string pairs yields no units
#[test]
fn test_parse_json_withNoStringPairs_shouldYieldNoUnits() {
    let doc = parse_json(r#"{"count": 3, "flags": [true, false]}"#);
    assert!(doc.units().is_empty());
}

/// Test that values with untouched keys stay byte-identical
#[test]
fn test_serialize_json_withUnknownKeys_shouldLeaveOtherPairsUntouched() {
    let raw = "{\n    \"title\"   :   \"Hello\",\n    \"sub\": \"World\"\n}";
    let output = serialize_json(&["sub".to_string()], &["Свят".to_string()], raw);
    assert_eq!(output, "{\n    \"title\"   :   \"Hello\",\n    \"sub\": \"Свят\"\n}");
}
