//! Utility functions and helpers.

pub mod html;
pub mod http;
pub mod log;
pub mod url;

/// Lowercase every entry and drop blanks, for case-insensitive keyword lists.
pub fn lowercase_all(items: &[String]) -> Vec<String> {
    items
        .iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Whether `haystack` (already lowercase) contains any of `needles`.
pub fn contains_any(haystack: &str, needles: &[String]) -> bool {
    needles.iter().any(|n| haystack.contains(n.as_str()))
}
