//! `Link` response header parsing for page based pagination.

use regex::Regex;
use std::sync::OnceLock;

fn segment_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"<([^>]+)>;\s*rel="(\w+)""#).expect("link segment pattern is valid")
    })
}

/// Extracts the `page` query parameter of the `rel="next"` link.
///
/// Returns `None` when the header has no next relation, or when the next
/// URL carries no numeric `page` parameter.
pub fn next_page(header: &str) -> Option<u32> {
    header
        .split(',')
        .filter_map(|segment| segment_pattern().captures(segment))
        .filter(|caps| &caps[2] == "next")
        .find_map(|caps| page_param(&caps[1]))
}

fn page_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[?&]page=(\d+)").expect("page pattern is valid"))
}

/// Reads `page` off the raw target, which may be relative.
fn page_param(uri: &str) -> Option<u32> {
    page_pattern()
        .captures(uri)
        .and_then(|caps| caps[1].parse().ok())
}
