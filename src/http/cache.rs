//! HTTP cache control module
//!
//! Provides the cache policy applied to static file responses, `ETag`
//! generation and conditional request evaluation.

use chrono::{DateTime, Utc};
use hyper::header::{HeaderValue, CACHE_CONTROL};
use hyper::Response;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::SystemTime;

/// Revalidate with the server before reusing a stored copy
pub const NO_CACHE: &str = "no-cache";

/// Hook run on a static file response after the file is selected but before
/// the response leaves the pipeline
pub type ResponseDecorator = fn(&mut Response<http_body_util::Full<hyper::body::Bytes>>);

/// Cache policy for served files
///
/// Browsers may store bundles but must revalidate them on every use, so an
/// unchanged bundle costs a 304 while a rebuilt one is picked up immediately.
/// Once bundle URLs carry a content hash this can become a long max-age.
///
/// A `Cache-Control` set by an earlier stage always wins.
pub fn decorate<B>(response: &mut Response<B>) {
    response
        .headers_mut()
        .entry(CACHE_CONTROL)
        .or_insert(HeaderValue::from_static(NO_CACHE));
}

/// Generate `ETag` using fast hashing
///
/// Returns a quoted `ETag` string, e.g. `"abc123def"`
pub fn generate_etag(content: &[u8]) -> String {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    format!("\"{:x}\"", hasher.finish())
}

/// Check if the client's `If-None-Match` header matches the server's `ETag`
///
/// Accepts a single tag, a comma separated list, or `*`.
pub fn check_etag_match(if_none_match: Option<&str>, etag: &str) -> bool {
    if_none_match.is_some_and(|client| {
        client.split(',').map(str::trim).any(|e| {
            e == "*" || e == etag || e.strip_prefix("W/") == Some(etag)
        })
    })
}

/// Format a timestamp as an HTTP date (`Sun, 06 Nov 1994 08:49:37 GMT`)
pub fn format_http_date(time: SystemTime) -> String {
    DateTime::<Utc>::from(time)
        .format("%a, %d %b %Y %H:%M:%S GMT")
        .to_string()
}

/// True when `If-Modified-Since` is at or after the file's modification time
///
/// Comparison happens at whole-second precision since that is all an HTTP
/// date carries. Unparsable dates never match.
pub fn not_modified_since(if_modified_since: Option<&str>, modified: SystemTime) -> bool {
    let Some(header) = if_modified_since else {
        return false;
    };
    let Ok(since) = DateTime::parse_from_rfc2822(header.trim()) else {
        return false;
    };
    DateTime::<Utc>::from(modified).timestamp() <= since.timestamp()
}
