use anyhow::{Result, anyhow};
use isolang::Language;

/// Language utilities for target language handling
///
/// The translation prompt and output filenames use the English language
/// name ("Bulgarian"). Users may give either that name or an ISO 639-1
/// (2-letter) / ISO 639-2 (3-letter) code; both resolve to the same name.

/// Map an ISO 639-2/B code onto its ISO 639-2/T equivalent
fn bibliographic_to_terminology(code: &str) -> Option<&'static str> {
    match code {
        "fre" => Some("fra"),
        "ger" => Some("deu"),
        "dut" => Some("nld"),
        "gre" => Some("ell"),
        "chi" => Some("zho"),
        "cze" => Some("ces"),
        "ice" => Some("isl"),
        "alb" => Some("sqi"),
        "arm" => Some("hye"),
        "baq" => Some("eus"),
        "bur" => Some("mya"),
        "per" => Some("fas"),
        "geo" => Some("kat"),
        "may" => Some("msa"),
        "mac" => Some("mkd"),
        "rum" => Some("ron"),
        "slo" => Some("slk"),
        "wel" => Some("cym"),
        _ => None,
    }
}

/// Map common short names onto the ISO 639-3 code of the language whose
/// reference name carries a qualifier ("Modern Greek (1453-)")
fn short_name_to_code(name: &str) -> Option<&'static str> {
    match name {
        "greek" => Some("ell"),
        "nepali" => Some("nep"),
        "malay" => Some("msa"),
        "swahili" => Some("swa"),
        "farsi" => Some("fas"),
        "punjabi" => Some("pan"),
        "oriya" => Some("ori"),
        "pashto" => Some("pus"),
        "uzbek" => Some("uzb"),
        "latvian" => Some("lav"),
        "estonian" => Some("est"),
        _ => None,
    }
}

/// Normalize a language code to ISO 639-2/T (3-letter) format
pub fn normalize_to_part2t(code: &str) -> Result<String> {
    let normalized_code = code.trim().to_lowercase();

    if normalized_code.len() == 2 {
        if let Some(lang) = Language::from_639_1(&normalized_code) {
            return Ok(lang.to_639_3().to_string());
        }
    } else if normalized_code.len() == 3 {
        if Language::from_639_3(&normalized_code).is_some() {
            return Ok(normalized_code);
        }
        if let Some(part2t) = bibliographic_to_terminology(&normalized_code) {
            return Ok(part2t.to_string());
        }
    }

    Err(anyhow!("Cannot normalize invalid language code: {}", code))
}

/// Get the language name from a code
pub fn get_language_name(code: &str) -> Result<String> {
    let normalized = normalize_to_part2t(code)?;
    let lang = Language::from_639_3(&normalized)
        .ok_or_else(|| anyhow!("Failed to get language from code: {}", normalized))?;

    Ok(lang.to_name().to_string())
}

/// Resolve user input (code or English name) into the English language name
pub fn resolve_language_name(input: &str) -> Result<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("Target language must not be empty"));
    }

    if trimmed.len() <= 3 {
        if let Ok(name) = get_language_name(trimmed) {
            return Ok(name);
        }
    }

    if let Some(lang) = Language::from_name(&title_case(trimmed)) {
        return Ok(lang.to_name().to_string());
    }

    short_name_to_code(&trimmed.to_lowercase())
        .and_then(Language::from_639_3)
        .map(|lang| lang.to_name().to_string())
        .ok_or_else(|| anyhow!("Unknown language: {}", input))
}

// "scottish gaelic" -> "Scottish Gaelic"
fn title_case(value: &str) -> String {
    value
        .split_whitespace()
        .map(|word| {
            let lower = word.to_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
