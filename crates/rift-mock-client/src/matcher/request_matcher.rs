//! Two-pass matching of an expectation against a real request.
//!
//! The first pass walks the configured dimensions in a fixed order and stops at
//! the first mismatch, so the reported reason always names the earliest failing
//! dimension. The second pass only runs for passing requests and adds up the
//! weights of the configured dimensions.

use super::match_result::MatchResult;
use crate::compare::{compare, compare_maps, map_to_value};
use crate::pattern::{multiparts_to_value, ContentKind, RequestPattern, UriMatcher};
use serde_json::Value;

/// Scores how well a real request satisfies an expectation.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestMatcher;

impl RequestMatcher {
    pub fn new() -> Self {
        Self
    }

    pub fn matches(&self, expectation: &RequestPattern, real: &RequestPattern) -> MatchResult {
        if expectation.is_empty() {
            return MatchResult::empty();
        }

        if let Some(mismatch) = find_mismatch(expectation, real) {
            return mismatch;
        }

        let mut result = MatchResult::create();

        if let Some(method) = expectation.http_method() {
            result.matches_method(method);
        }
        if let Some(matcher) = expectation.uri_matcher_ref() {
            let uri = match matcher {
                UriMatcher::Literal(_) => expectation.resolved_uri().unwrap_or_default(),
                UriMatcher::Predicate(_) => "<callable>".to_string(),
            };
            result.matches_uri(&uri);
        }
        if let Some(query_params) = expectation.query_params() {
            result.matches_query_params(map_to_value(query_params));
        }
        if let Some(content) = expectation.body() {
            result.matches_content(content);
        }
        if let Some(multiparts) = expectation.multiparts() {
            result.matches_multiparts(multiparts_to_value(multiparts));
        }

        // Header-only expectations pass without earning points.
        if result.is_mismatch() {
            return MatchResult::empty();
        }

        result
    }
}

fn find_mismatch(expectation: &RequestPattern, real: &RequestPattern) -> Option<MatchResult> {
    if let Some(method) = expectation.http_method() {
        if real.http_method() != Some(method) {
            return Some(MatchResult::mismatching_method(method, real.http_method()));
        }
    }

    if let Some(mismatch) = uri_mismatch(expectation, real) {
        return Some(mismatch);
    }

    if let Some(expected) = expectation.query_params() {
        let expected = map_to_value(expected);
        let actual = real.query_params().map_or(Value::Null, map_to_value);
        if !compare(&actual, &expected) {
            return Some(MatchResult::mismatching_query_params(&expected, &actual));
        }
    }

    if let Some(headers) = expectation.headers() {
        for (name, expected) in headers {
            match real.header_value(name) {
                None => return Some(MatchResult::missing_header(name, expected)),
                Some(actual) if actual != expected => {
                    return Some(MatchResult::mismatching_header(name, expected, actual))
                }
                Some(_) => {}
            }
        }
    }

    if let Some(mismatch) = content_mismatch(expectation, real) {
        return Some(mismatch);
    }

    if let Some(expected) = expectation.multiparts() {
        let expected = multiparts_to_value(expected);
        let actual = real.multiparts().map_or(Value::Null, multiparts_to_value);
        if !compare(&actual, &expected) {
            return Some(MatchResult::mismatching_multiparts(&expected, &actual));
        }
    }

    let reason = expectation
        .that_predicate()
        .and_then(|that| that.check(expectation, real))?;
    Some(MatchResult::mismatching_that(&reason))
}

fn uri_mismatch(expectation: &RequestPattern, real: &RequestPattern) -> Option<MatchResult> {
    let actual = real.resolved_uri();

    match expectation.uri_matcher_ref()? {
        UriMatcher::Predicate(predicate) => {
            let candidate = actual.as_deref().unwrap_or_default();
            (!predicate.matches(candidate, expectation.uri_params()))
                .then(|| MatchResult::mismatching_uri("<callable>", actual.as_deref()))
        }
        UriMatcher::Literal(_) => {
            let expected = expectation.resolved_uri().unwrap_or_default();
            (actual.as_deref() != Some(expected.as_str()))
                .then(|| MatchResult::mismatching_uri(&expected, actual.as_deref()))
        }
    }
}

/// Compare bodies according to the expectation's content kind.
fn content_mismatch(expectation: &RequestPattern, real: &RequestPattern) -> Option<MatchResult> {
    let expected = expectation.body()?;
    let actual = real.body();

    let matched = match expectation.content_kind() {
        ContentKind::None => true,
        ContentKind::Json => match (expectation.json_value(), real.json_value()) {
            (Some(expected), Some(actual)) => compare(&actual, &expected),
            _ => false,
        },
        ContentKind::Xml => match (expectation.xml_canonical(), real.xml_canonical()) {
            (Some(expected), Some(actual)) => expected == actual,
            _ => false,
        },
        ContentKind::FormEncoded => {
            real.has_form_params()
                && compare_maps(&real.request_params(), &expectation.request_params())
        }
        ContentKind::Plain => actual == Some(expected),
    };

    if matched {
        return None;
    }

    Some(match expectation.content_kind() {
        ContentKind::Json => MatchResult::mismatching_json_content(expected, actual),
        ContentKind::Xml => MatchResult::mismatching_xml_content(expected, actual),
        ContentKind::FormEncoded => MatchResult::mismatching_request_params(expected, actual),
        ContentKind::None | ContentKind::Plain => MatchResult::mismatching_content(expected, actual),
    })
}
