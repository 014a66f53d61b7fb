//! HTTP cache control module
//!
//! `ETag` generation, conditional request checks and `Cache-Control` values.

use chrono::{DateTime, Utc};
use hyper::header::{IF_MODIFIED_SINCE, IF_NONE_MATCH};
use hyper::HeaderMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use uuid::Uuid;

/// Generate a content-derived `ETag` using fast hashing
///
/// Returns a quoted string, e.g. `"abc123def"`.
pub fn generate_etag(content: &[u8]) -> String {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    let v = hasher.finish();
    format!("\"{v:x}\"")
}

/// Generate a random `ETag` in v4 UUID form
///
/// Version nibble is `4`, variant nibble one of `8`, `9`, `a`, `b`.
/// A new value every call; it does not identify content.
pub fn generate_random_etag() -> String {
    Uuid::new_v4().hyphenated().to_string()
}

/// Check if client's `If-None-Match` header matches the server's `ETag`
///
/// Supports a single `ETag`, a comma separated list, and the `*` wildcard.
pub fn check_etag_match(if_none_match: Option<&str>, etag: &str) -> bool {
    if_none_match.is_some_and(|client_etag| {
        client_etag
            .split(',')
            .any(|e| e.trim() == etag || e.trim() == "*")
    })
}

/// True when the request carries `If-None-Match` or `If-Modified-Since`
pub fn has_conditional_headers(headers: &HeaderMap) -> bool {
    headers.contains_key(IF_NONE_MATCH) || headers.contains_key(IF_MODIFIED_SINCE)
}

/// Format a timestamp as an HTTP date (IMF-fixdate)
pub fn http_date(time: DateTime<Utc>) -> String {
    time.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// `Cache-Control` value for a max-age in seconds; zero disables caching
pub fn cache_control(max_age: u32) -> String {
    if max_age == 0 {
        "no-cache".to_string()
    } else {
        format!("public, max-age={max_age}")
    }
}
