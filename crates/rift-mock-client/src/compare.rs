//! Structural comparison for request data (JSON bodies, query params, headers, multiparts).
//!
//! Scalars compare strictly: type and value must both match, so `1`, `1.0` and `"1"`
//! are three different values. Objects and arrays compare as keyed bags:
//!
//! - Named keys must exist on both sides with structurally equal values
//! - Positional entries (array elements, or object keys that are numeric strings) must find
//!   *some* equal positional entry on the other side, in either direction
//!
//! Element order never matters, at any nesting level.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

static NUMERIC_KEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[ \t\n\r\x0B\x0C]*[+-]?([0-9]+(\.[0-9]*)?|\.[0-9]+)([eE][+-]?[0-9]+)?[ \t\n\r\x0B\x0C]*$")
        .expect("numeric key regex is valid")
});

/// A single entry of an object or array, with its key classified.
#[derive(Debug, Clone, Copy)]
enum Entry<'a> {
    Positional(&'a Value),
    Named(&'a str, &'a Value),
}

/// Compare two values structurally.
///
/// Returns `true` when `actual` and `expected` are structurally equal under bag
/// semantics for list-like data. The check runs in both directions, so an actual
/// array with extra entries never passes.
pub fn compare(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Array(_) | Value::Object(_), Value::Array(_) | Value::Object(_)) => {
            let actual_entries = entries(actual);
            let expected_entries = entries(expected);

            contains_all(&actual_entries, &expected_entries)
                && contains_all(&expected_entries, &actual_entries)
        }
        _ => actual == expected,
    }
}

/// Compare two string maps (query params, form params) structurally.
pub fn compare_maps(actual: &BTreeMap<String, String>, expected: &BTreeMap<String, String>) -> bool {
    compare(&map_to_value(actual), &map_to_value(expected))
}

/// Convert a string map into a JSON object for comparison and reporting.
pub fn map_to_value(map: &BTreeMap<String, String>) -> Value {
    Value::Object(
        map.iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect::<Map<String, Value>>(),
    )
}

fn entries(value: &Value) -> Vec<Entry<'_>> {
    match value {
        Value::Array(items) => items.iter().map(Entry::Positional).collect(),
        Value::Object(map) => map
            .iter()
            .map(|(key, value)| {
                if is_positional_key(key) {
                    Entry::Positional(value)
                } else {
                    Entry::Named(key.as_str(), value)
                }
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Numeric keys (`1`, `-2`, `1.5`, `1e3`, ` 7`) behave like list indices,
/// everything else is a field name.
fn is_positional_key(key: &str) -> bool {
    NUMERIC_KEY.is_match(key)
}

/// Every entry of `needles` must be found in `haystack`.
///
/// Each positional entry of `haystack` can satisfy one needle only, so repeated
/// values must occur equally often on both sides.
fn contains_all(haystack: &[Entry<'_>], needles: &[Entry<'_>]) -> bool {
    let mut used = vec![false; haystack.len()];

    needles.iter().all(|needle| match needle {
        Entry::Positional(value) => {
            let found = haystack.iter().enumerate().position(|(index, candidate)| {
                !used[index] && matches!(candidate, Entry::Positional(other) if compare(other, value))
            });
            match found {
                Some(index) => {
                    used[index] = true;
                    true
                }
                None => false,
            }
        }
        Entry::Named(key, value) => haystack.iter().any(
            |candidate| matches!(candidate, Entry::Named(other_key, other) if other_key == key && compare(other, value)),
        ),
    })
}
