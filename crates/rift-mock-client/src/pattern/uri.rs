//! URI matching: literal templates or custom predicates, plus query-string helpers.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

type UriPredicateFn = dyn Fn(&str, &BTreeMap<String, String>) -> bool + Send + Sync;

/// Custom URI check, called with the real request's URI and the pattern's URI params.
#[derive(Clone)]
pub struct UriPredicate(Arc<UriPredicateFn>);

impl UriPredicate {
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&str, &BTreeMap<String, String>) -> bool + Send + Sync + 'static,
    {
        Self(Arc::new(predicate))
    }

    pub fn matches(&self, actual_uri: &str, uri_params: &BTreeMap<String, String>) -> bool {
        (self.0)(actual_uri, uri_params)
    }
}

impl fmt::Debug for UriPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<callable>")
    }
}

/// How a pattern pins the URI.
#[derive(Debug, Clone)]
pub enum UriMatcher {
    /// A path or URL, possibly containing `{name}` placeholders.
    Literal(String),
    /// A custom matcher, evaluated at match time.
    Predicate(UriPredicate),
}

impl UriMatcher {
    pub fn predicate<F>(predicate: F) -> Self
    where
        F: Fn(&str, &BTreeMap<String, String>) -> bool + Send + Sync + 'static,
    {
        UriMatcher::Predicate(UriPredicate::new(predicate))
    }

    pub fn is_predicate(&self) -> bool {
        matches!(self, UriMatcher::Predicate(_))
    }
}

/// Substitute `{name}` placeholders with their values.
pub fn replace_uri_params(template: &str, uri_params: &BTreeMap<String, String>) -> String {
    uri_params
        .iter()
        .fold(template.to_string(), |uri, (key, value)| {
            uri.replace(&format!("{{{key}}}"), value)
        })
}

/// Split `key=value&key=value` into percent-decoded pairs, in wire order.
///
/// Pairs without `=` get an empty value; empty segments are skipped.
pub fn encoded_pairs(encoded: &str) -> impl Iterator<Item = (String, String)> + '_ {
    encoded
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((key, value)) => (decode_component(key), decode_component(value)),
            None => (decode_component(pair), String::new()),
        })
}

/// Parse `key=value&key=value` into a map. A repeated key keeps its last value.
pub fn parse_encoded_params(encoded: &str) -> BTreeMap<String, String> {
    encoded_pairs(encoded).collect()
}

/// Form-style encoding: percent-encoding with spaces as `+`.
pub fn encode_component(value: &str) -> String {
    urlencoding::encode(value).replace("%20", "+")
}

/// Form-style decoding: `+` is a space, invalid UTF-8 is replaced.
pub fn decode_component(value: &str) -> String {
    let spaced = value.replace('+', " ");
    String::from_utf8_lossy(&urlencoding::decode_binary(spaced.as_bytes())).into_owned()
}
