//! Header name helpers shared by request patterns and mock responses.
//!
//! Header names are stored lowercased everywhere; canonical casing is only
//! produced for human-readable rendering.

pub use hyper::header::{AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE, ETAG};

pub const MIME_JSON: &str = "application/json";
pub const MIME_XML: &str = "text/xml";
pub const MIME_FORM: &str = "application/x-www-form-urlencoded";

/// Lowercase a header name for storage and lookup.
pub fn normalize_header_name(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}

/// Render a header name with each dash-separated word capitalized
/// (`content-type` becomes `Content-Type`).
pub fn canonical_header_name(name: &str) -> String {
    name.split('-')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}

/// Split a raw `Name: value` header line.
pub fn split_header_line(line: &str) -> Option<(&str, &str)> {
    line.split_once(": ")
        .or_else(|| line.split_once(':'))
        .map(|(name, value)| (name.trim(), value.trim()))
        .filter(|(name, _)| !name.is_empty())
}
