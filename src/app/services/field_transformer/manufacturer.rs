//! Manufacturer name canonicalization

use crate::constants::UNKNOWN_MANUFACTURER;

/// Normalized alias and the canonical name it maps to
///
/// Keys are in normalized form (see [`normalize_manufacturer`]). Every
/// canonical name also appears as a key mapping to itself, which is what
/// makes [`standardize_manufacturer`] idempotent. Substring fallback scans
/// this table top to bottom and takes the first hit.
pub const MANUFACTURER_ALIASES: &[(&str, &str)] = &[
    ("MEDTRONIC", "Medtronic"),
    ("MEDTRONIC INC", "Medtronic"),
    ("MEDTRONIC MINIMED", "Medtronic"),
    ("ABBOTT", "Abbott"),
    ("ABBOTT LABORATORIES", "Abbott"),
    ("ABBOTT DIABETES CARE", "Abbott"),
    ("ST. JUDE MEDICAL", "St. Jude Medical"),
    ("ST JUDE MEDICAL", "St. Jude Medical"),
    ("BOSTON SCIENTIFIC", "Boston Scientific"),
    ("BOSTON SCIENTIFIC CORPORATION", "Boston Scientific"),
    ("BECTON DICKINSON", "Becton Dickinson"),
    ("BECTON DICKINSON & CO", "Becton Dickinson"),
    ("C.R. BARD", "C.R. Bard"),
    ("JOHNSON & JOHNSON", "Johnson & Johnson"),
    ("ETHICON", "Ethicon"),
    ("DEPUY", "DePuy"),
    ("DEPUY SYNTHES", "DePuy"),
    ("STRYKER", "Stryker"),
    ("ZIMMER BIOMET", "Zimmer Biomet"),
    ("ZIMMER", "Zimmer Biomet"),
    ("BIOMET", "Zimmer Biomet"),
    ("BAXTER", "Baxter"),
    ("BAXTER HEALTHCARE", "Baxter"),
    ("PHILIPS", "Philips"),
    ("PHILIPS RESPIRONICS", "Philips"),
    ("GE HEALTHCARE", "GE Healthcare"),
    ("GE MEDICAL SYSTEMS", "GE Healthcare"),
    ("SIEMENS HEALTHINEERS", "Siemens Healthineers"),
    ("SIEMENS", "Siemens Healthineers"),
    ("COVIDIEN", "Covidien"),
    ("DEXCOM", "Dexcom"),
    ("INSULET", "Insulet"),
    ("TANDEM DIABETES CARE", "Tandem Diabetes Care"),
    ("INTUITIVE SURGICAL", "Intuitive Surgical"),
    ("SMITH & NEPHEW", "Smith & Nephew"),
    ("OLYMPUS", "Olympus"),
    ("ALLERGAN", "Allergan"),
];

/// Trim, collapse whitespace, ASCII upper-case and drop trailing `.`/`,`
pub fn normalize_manufacturer(name: &str) -> String {
    let collapsed = name
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_uppercase();

    collapsed
        .trim_end_matches(|c: char| c == '.' || c == ',' || c == ' ')
        .to_string()
}

/// Canonical manufacturer name for a raw string
///
/// Tries an exact alias match on the normalized name, then the first alias
/// key (in table order) that contains the name or is contained in it, and
/// otherwise title-cases the normalized name. Empty input gives `"Unknown"`.
pub fn standardize_manufacturer(name: &str) -> String {
    let normalized = normalize_manufacturer(name);
    if normalized.is_empty() {
        return UNKNOWN_MANUFACTURER.to_string();
    }

    if let Some((_, canonical)) = MANUFACTURER_ALIASES
        .iter()
        .find(|(alias, _)| *alias == normalized)
    {
        return canonical.to_string();
    }

    if let Some((_, canonical)) = MANUFACTURER_ALIASES
        .iter()
        .find(|(alias, _)| normalized.contains(alias) || alias.contains(normalized.as_str()))
    {
        return canonical.to_string();
    }

    title_case(&normalized)
}

/// Upper-case ASCII letters that start a word, lower-case the rest
fn title_case(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    let mut word_start = true;

    for c in value.chars() {
        if word_start {
            result.push(c.to_ascii_uppercase());
        } else {
            result.push(c.to_ascii_lowercase());
        }
        word_start = !c.is_alphanumeric();
    }

    result
}
