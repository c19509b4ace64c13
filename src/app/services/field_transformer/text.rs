//! Narrative text cleanup

/// Normalize free text for storage
///
/// Drops control characters other than newline and tab, collapses runs of
/// horizontal whitespace to a single space, trims every line, allows at most
/// one blank line in a row and trims the result.
pub fn sanitize_text(value: &str) -> String {
    let cleaned: String = value
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect();

    let mut lines: Vec<String> = Vec::new();
    let mut previous_blank = false;

    for line in cleaned.split('\n') {
        let line = line.split_whitespace().collect::<Vec<_>>().join(" ");

        if line.is_empty() {
            if previous_blank {
                continue;
            }
            previous_blank = true;
        } else {
            previous_blank = false;
        }
        lines.push(line);
    }

    lines.join("\n").trim().to_string()
}

/// Trimmed text, or `None` when nothing remains
pub fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Trimmed upper-case code, or `None` when nothing remains
pub fn normalize_code(value: &str) -> Option<String> {
    non_empty(value).map(|v| v.to_ascii_uppercase())
}
