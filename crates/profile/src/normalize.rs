//! Text normalization shared by profile fields.

/// Collapses repeated whitespace, trims edges, and turns newlines into a single ' '.
pub fn collapse_whitespace(s: &str) -> String {
    let mut normalized = String::with_capacity(s.len());
    for segment in s.split_whitespace() {
        if !normalized.is_empty() {
            normalized.push(' ');
        }
        normalized.push_str(segment);
    }
    normalized
}

/// Comparison key for locations and technology names: whitespace-collapsed and lowercased.
pub fn normalize_key(s: &str) -> String {
    collapse_whitespace(s).to_lowercase()
}

/// Trimmed copy of `value`, or `None` when it is missing or blank.
pub(crate) fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(collapse_whitespace)
        .filter(|v| !v.is_empty())
}
