use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::normalize::normalize_key;

/// Normalized, deduplicated set of technology names.
///
/// Every entry is trimmed, whitespace-collapsed and lowercased on insert, so
/// `"Python"` and `"python "` collapse into one member. Iteration order is
/// lexicographic, which keeps reports and summaries deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct TechSet(BTreeSet<String>);

impl TechSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Split a free-text technology line on `,` `;` and `/`.
    pub fn parse_delimited(line: &str) -> Self {
        line.split([',', ';', '/']).collect()
    }

    /// Insert a technology name; blank names are ignored. Returns `true` when the
    /// normalized name was not already present.
    pub fn insert(&mut self, name: &str) -> bool {
        let key = normalize_key(name);
        if key.is_empty() {
            return false;
        }
        self.0.insert(key)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(&normalize_key(name))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Members present in both sets, in lexicographic order.
    pub fn intersection<'a>(&'a self, other: &'a TechSet) -> impl Iterator<Item = &'a str> {
        self.0.intersection(&other.0).map(String::as_str)
    }

    pub fn overlap_count(&self, other: &TechSet) -> usize {
        self.0.intersection(&other.0).count()
    }
}

impl<S: AsRef<str>> FromIterator<S> for TechSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = TechSet::new();
        for name in iter {
            set.insert(name.as_ref());
        }
        set
    }
}

impl From<Vec<String>> for TechSet {
    fn from(value: Vec<String>) -> Self {
        value.into_iter().collect()
    }
}

impl From<TechSet> for Vec<String> {
    fn from(value: TechSet) -> Self {
        value.0.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_normalizes_and_dedupes() {
        let set: TechSet = ["Python", "python ", "  PYTHON", "Go"].into_iter().collect();
        assert_eq!(set.len(), 2);
        assert!(set.contains("python"));
        assert!(set.contains(" GO "));
    }

    #[test]
    fn blank_entries_are_skipped() {
        let set = TechSet::parse_delimited("rust, , ;/ postgres");
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["postgres", "rust"]);
    }

    #[test]
    fn parse_delimited_splits_on_all_separators() {
        let set = TechSet::parse_delimited("React/Node.js; TypeScript, AWS");
        assert_eq!(set.len(), 4);
        assert!(set.contains("node.js"));
        assert!(set.contains("typescript"));
    }

    #[test]
    fn overlap_is_case_insensitive() {
        let a: TechSet = ["Python", "Go"].into_iter().collect();
        let b: TechSet = ["python ", "Rust"].into_iter().collect();
        assert_eq!(a.overlap_count(&b), 1);
        assert_eq!(a.intersection(&b).collect::<Vec<_>>(), vec!["python"]);
    }

    #[test]
    fn serde_uses_plain_list() {
        let set: TechSet = ["Rust", "Go"].into_iter().collect();
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"["go","rust"]"#);

        let parsed: TechSet = serde_json::from_str(r#"["Rust ", "rust", "SQL"]"#).unwrap();
        assert_eq!(parsed.len(), 2);
    }
}
