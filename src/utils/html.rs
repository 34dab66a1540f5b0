//! HTML-to-text helpers for posting descriptions.

use scraper::Html;

/// Extract visible text from an HTML fragment, collapsing whitespace.
///
/// Plain text passes through unchanged apart from whitespace.
pub fn strip_html(fragment: &str) -> String {
    let document = Html::parse_fragment(fragment);
    let text: Vec<&str> = document.root_element().text().collect();
    text.join(" ").split_whitespace().collect::<Vec<_>>().join(" ")
}
