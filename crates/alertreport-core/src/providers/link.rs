//! `Link` response header handling.
//!
//! GitHub paginates list endpoints with RFC 8288 links:
//! `<https://api.github.com/...&page=2>; rel="next", <...&page=5>; rel="last"`.

use reqwest::header::{HeaderMap, LINK};

/// URL of the `rel="next"` link, if the response has one.
pub fn next_page_url(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(LINK)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|v| find_rel(v, "next"))
}

/// Find the target of the first link whose `rel` includes `wanted`.
pub fn find_rel(header: &str, wanted: &str) -> Option<String> {
    let mut rest = header;
    while let Some(start) = rest.find('<') {
        let after = &rest[start + 1..];
        let end = after.find('>')?;
        let target = &after[..end];
        let tail = &after[end + 1..];
        let params_end = tail.find('<').unwrap_or(tail.len());

        if tail[..params_end].split(';').any(|p| rel_matches(p, wanted)) {
            return Some(target.trim().to_string());
        }
        rest = &tail[params_end..];
    }
    None
}

fn rel_matches(param: &str, wanted: &str) -> bool {
    let Some((key, value)) = param.split_once('=') else {
        return false;
    };
    if !key.trim().eq_ignore_ascii_case("rel") {
        return false;
    }
    // rel may hold several space-separated relation types
    value
        .trim()
        .trim_end_matches(',')
        .trim()
        .trim_matches('"')
        .split_whitespace()
        .any(|rel| rel.eq_ignore_ascii_case(wanted))
}
