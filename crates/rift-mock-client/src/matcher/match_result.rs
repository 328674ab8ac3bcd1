//! Outcome of matching one pattern against one real request.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

const METHOD_SCORE: u32 = 10;
const URI_SCORE: u32 = 20;
const QUERY_PARAMS_SCORE: u32 = 5;
const CONTENT_SCORE: u32 = 5;
const MULTIPARTS_SCORE: u32 = 5;

/// A request dimension that contributed to a match score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchDimension {
    Method,
    Uri,
    QueryParams,
    Content,
    Multiparts,
}

/// Score and diagnostics for a single match attempt.
///
/// A score of zero is a mismatch; mismatches carry a human-readable reason.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    score: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
    matches: BTreeMap<MatchDimension, Value>,
}

impl MatchResult {
    fn with(score: u32, reason: Option<String>) -> Self {
        Self {
            score,
            reason,
            matches: BTreeMap::new(),
        }
    }

    /// Match of an unconfigured pattern: the lowest passing score.
    pub fn empty() -> Self {
        Self::with(1, None)
    }

    /// Starting point for additive scoring.
    pub fn create() -> Self {
        Self::with(0, None)
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn is_mismatch(&self) -> bool {
        self.score == 0
    }

    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    pub fn matches(&self) -> &BTreeMap<MatchDimension, Value> {
        &self.matches
    }

    fn add(&mut self, dimension: MatchDimension, points: u32, value: Value) {
        self.score += points;
        self.matches.insert(dimension, value);
    }

    pub fn matches_method(&mut self, method: &str) {
        self.add(MatchDimension::Method, METHOD_SCORE, Value::from(method));
    }

    pub fn matches_uri(&mut self, uri: &str) {
        self.add(MatchDimension::Uri, URI_SCORE, Value::from(uri));
    }

    pub fn matches_query_params(&mut self, query_params: Value) {
        self.add(MatchDimension::QueryParams, QUERY_PARAMS_SCORE, query_params);
    }

    pub fn matches_content(&mut self, content: &str) {
        self.add(MatchDimension::Content, CONTENT_SCORE, Value::from(content));
    }

    pub fn matches_multiparts(&mut self, multiparts: Value) {
        self.add(MatchDimension::Multiparts, MULTIPARTS_SCORE, multiparts);
    }

    // ===== Mismatch factories =====

    fn mismatch(reason: String) -> Self {
        Self::with(0, Some(reason))
    }

    pub fn mismatching_method(expected: &str, actual: Option<&str>) -> Self {
        Self::mismatch(format!(
            "Mismatching method, expected {expected}, got {}",
            or_null(actual)
        ))
    }

    pub fn mismatching_uri(expected: &str, actual: Option<&str>) -> Self {
        Self::mismatch(format!(
            "Mismatching uri, expected {expected}, got {}",
            or_null(actual)
        ))
    }

    pub fn mismatching_query_params(expected: &Value, actual: &Value) -> Self {
        Self::mismatch(format!(
            "Mismatching query params, expected {expected}, got {actual}"
        ))
    }

    pub fn missing_header(name: &str, expected: &str) -> Self {
        Self::mismatch(format!(
            "Missing header, expected {name}: {}",
            Value::from(expected)
        ))
    }

    pub fn mismatching_header(name: &str, expected: &str, actual: &str) -> Self {
        Self::mismatch(format!(
            "Mismatching header {name}, expected {}, got {}",
            Value::from(expected),
            Value::from(actual)
        ))
    }

    pub fn mismatching_json_content(expected: &str, actual: Option<&str>) -> Self {
        Self::mismatch(format!(
            "Mismatching json content, expected {expected}, got {}",
            or_null(actual)
        ))
    }

    pub fn mismatching_xml_content(expected: &str, actual: Option<&str>) -> Self {
        Self::mismatch(format!(
            "Mismatching xml content, expected {expected}, got {}",
            or_null(actual)
        ))
    }

    pub fn mismatching_request_params(expected: &str, actual: Option<&str>) -> Self {
        Self::mismatch(format!(
            "Mismatching request parameters, expected {expected}, got {}",
            or_null(actual)
        ))
    }

    pub fn mismatching_content(expected: &str, actual: Option<&str>) -> Self {
        Self::mismatch(format!(
            "Mismatching content, expected {expected}, got {}",
            or_null(actual)
        ))
    }

    pub fn mismatching_multiparts(expected: &Value, actual: &Value) -> Self {
        Self::mismatch(format!(
            "Mismatching multiparts, expected {expected}, got {actual}"
        ))
    }

    pub fn mismatching_that(reason: &str) -> Self {
        Self::mismatch(format!("Mismatching that, reason: {reason}"))
    }
}

fn or_null(value: Option<&str>) -> &str {
    value.unwrap_or("NULL")
}
