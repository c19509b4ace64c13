//! Integer and flag parsing

/// Parse an integer, truncating a trailing decimal fraction
///
/// `"1.0"` and `"1.9"` both give 1. Empty, non-numeric and out-of-range
/// input gives `None`.
pub fn parse_int(value: &str) -> Option<i64> {
    let value = value.trim();

    let (whole, fraction) = match value.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (value, None),
    };

    if let Some(fraction) = fraction {
        if fraction.is_empty() || !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
    }

    let digits = whole.strip_prefix(['+', '-']).unwrap_or(whole);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    whole.parse().ok()
}

/// Parse a `Y`/`N` flag, case-insensitively
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim() {
        "Y" | "y" => Some(true),
        "N" | "n" => Some(false),
        _ => None,
    }
}
