// src/utils/url.rs

//! URL manipulation utilities.

use url::Url;

/// Query parameters that only track the click and never identify a posting.
const TRACKING_PARAMS: &[&str] = &["ref", "refid", "trackingid", "trk", "from", "src"];

/// Canonical form of a posting URL.
///
/// Drops the fragment and tracking parameters so the same posting reached
/// through different searches compares equal. Returns `None` for anything
/// that is not an absolute http(s) URL.
///
/// # Examples
/// ```
/// use jobboard::utils::url::canonical_url;
///
/// assert_eq!(
///     canonical_url("https://www.indeed.com/viewjob?jk=42&utm_campaign=x#apply"),
///     Some("https://www.indeed.com/viewjob?jk=42".to_string())
/// );
/// ```
pub fn canonical_url(raw: &str) -> Option<String> {
    let mut url = Url::parse(raw.trim()).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    url.set_fragment(None);

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| {
            let key = key.to_lowercase();
            !key.starts_with("utm_") && !TRACKING_PARAMS.contains(&key.as_str())
        })
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    if kept.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(kept);
    }

    Some(url.to_string())
}

/// Extract domain from a URL.
///
/// # Examples
/// ```
/// use jobboard::utils::url::get_domain;
///
/// assert_eq!(
///     get_domain("https://example.com/path"),
///     Some("example.com".to_string())
/// );
/// ```
pub fn get_domain(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_lowercase()))
}

/// Name of the job board a URL belongs to.
///
/// Known boards map to their short name; anything else falls back to the
/// bare domain.
pub fn source_from_url(url: &str) -> Option<String> {
    const BOARDS: &[&str] = &["indeed", "linkedin", "glassdoor", "ziprecruiter", "google"];

    let domain = get_domain(url)?;
    let bare = domain.trim_start_matches("www.");
    let board = BOARDS
        .iter()
        .find(|board| bare.split('.').any(|label| label == **board));

    Some(match board {
        Some(board) => board.to_string(),
        None => bare.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_url_strips_tracking() {
        assert_eq!(
            canonical_url("https://www.linkedin.com/jobs/view/123/?refId=abc&trk=public"),
            Some("https://www.linkedin.com/jobs/view/123/".to_string())
        );
        assert_eq!(
            canonical_url("https://www.indeed.com/viewjob?jk=42&from=serp&utm_source=x"),
            Some("https://www.indeed.com/viewjob?jk=42".to_string())
        );
    }

    #[test]
    fn test_canonical_url_lowercases_host() {
        assert_eq!(
            canonical_url("HTTPS://WWW.Glassdoor.com/job-listing/abc"),
            Some("https://www.glassdoor.com/job-listing/abc".to_string())
        );
    }

    #[test]
    fn test_canonical_url_rejects_non_http() {
        assert_eq!(canonical_url("mailto:jobs@example.com"), None);
        assert_eq!(canonical_url("/relative/path"), None);
    }

    #[test]
    fn test_source_from_url() {
        assert_eq!(
            source_from_url("https://www.indeed.com/viewjob?jk=1"),
            Some("indeed".to_string())
        );
        assert_eq!(
            source_from_url("https://uk.linkedin.com/jobs/view/1"),
            Some("linkedin".to_string())
        );
        assert_eq!(
            source_from_url("https://careers.acme.com/jobs/1"),
            Some("careers.acme.com".to_string())
        );
    }
}
