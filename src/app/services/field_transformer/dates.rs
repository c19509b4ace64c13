//! Date parsing across the formats used by different extract eras

use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

/// How a shape-matched string is turned into a date
enum DateFormat {
    Chrono(&'static str),
    CompactYmd,
}

struct DatePattern {
    shape: Regex,
    format: DateFormat,
}

// Patterns are tried in order. The shape check keeps chrono's lenient
// numeric parsing from letting `%Y` accept a two-digit year.
static DATE_PATTERNS: LazyLock<Vec<DatePattern>> = LazyLock::new(|| {
    [
        (r"^\d{1,2}/\d{1,2}/\d{4}$", DateFormat::Chrono("%m/%d/%Y")),
        (r"^\d{4}-\d{1,2}-\d{1,2}$", DateFormat::Chrono("%Y-%m-%d")),
        (r"^\d{8}$", DateFormat::CompactYmd),
        (r"^\d{1,2}-[A-Za-z]{3}-\d{4}$", DateFormat::Chrono("%d-%b-%Y")),
        (r"^\d{1,2}/\d{1,2}/\d{2}$", DateFormat::Chrono("%m/%d/%y")),
    ]
    .into_iter()
    .filter_map(|(shape, format)| Regex::new(shape).ok().map(|shape| DatePattern { shape, format }))
    .collect()
});

/// Parse a date in any supported extract format
///
/// Accepted, in order: `MM/DD/YYYY`, `YYYY-MM-DD`, `YYYYMMDD`, `DD-Mon-YYYY`
/// and `MM/DD/YY`. Anything else, including impossible calendar dates, gives
/// `None`.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    DATE_PATTERNS
        .iter()
        .filter(|pattern| pattern.shape.is_match(value))
        .find_map(|pattern| match pattern.format {
            DateFormat::Chrono(format) => NaiveDate::parse_from_str(value, format).ok(),
            DateFormat::CompactYmd => parse_compact_ymd(value),
        })
}

fn parse_compact_ymd(value: &str) -> Option<NaiveDate> {
    let year = value.get(0..4)?.parse().ok()?;
    let month = value.get(4..6)?.parse().ok()?;
    let day = value.get(6..8)?.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}
