//! Request patterns: the description of an expected (or recorded real) request.
//!
//! A `RequestPattern` is built fluently by test code, registered, and then owns its
//! response queue and the history of real requests it matched. Real requests are
//! normalized into the same type (without responses) so both sides of a match
//! share one model.
//!
//! ## Module Structure
//!
//! - `uri`: literal-or-predicate URI matching and query-string helpers
//! - `content`: body classification (JSON, XML, form-encoded, plain) and XML canonicalization
//! - `multipart`: multipart field descriptions
//! - `display`: human-readable rendering used in error messages

mod content;
mod display;
mod multipart;
mod uri;

pub use content::{canonical_xml, extract_xpath, has_form_shape, is_json, is_xml, ContentKind};
pub use multipart::{multiparts_to_value, MultipartKind, MultipartPart};
pub use uri::{
    decode_component, encode_component, encoded_pairs, parse_encoded_params, replace_uri_params,
    UriMatcher, UriPredicate,
};

use crate::error::{ConfiguredError, MockError};
use crate::headers::{normalize_header_name, AUTHORIZATION};
use crate::registry::CallStack;
use crate::response::{MockResponse, QueueItem, ResponseQueue};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use once_cell::sync::OnceCell;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;
use std::sync::Arc;

type ThatFn = dyn Fn(&RequestPattern, &RequestPattern) -> Option<String> + Send + Sync;
type MatchCallbackFn = dyn Fn(&RequestPattern) + Send + Sync;

/// Extra check run against `(expectation, real request)`.
///
/// Returning a non-empty reason marks the real request as a mismatch.
#[derive(Clone)]
pub struct ThatPredicate(Arc<ThatFn>);

impl ThatPredicate {
    pub fn check(&self, expectation: &RequestPattern, real: &RequestPattern) -> Option<String> {
        (self.0)(expectation, real).filter(|reason| !reason.is_empty())
    }
}

impl fmt::Debug for ThatPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<callable>")
    }
}

/// Callback invoked with the real request once it has been recorded.
#[derive(Clone)]
pub struct MatchCallback(Arc<MatchCallbackFn>);

impl MatchCallback {
    pub fn call(&self, real: &RequestPattern) {
        (self.0)(real)
    }
}

impl fmt::Debug for MatchCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<callable>")
    }
}

/// An expected request pattern, or a normalized real request.
#[derive(Debug, Clone, Default)]
pub struct RequestPattern {
    method: Option<String>,
    uri: Option<UriMatcher>,
    uri_params: BTreeMap<String, String>,
    headers: Option<BTreeMap<String, String>>,
    query_params: Option<BTreeMap<String, String>>,
    content: Option<String>,
    content_kind: OnceCell<ContentKind>,
    multiparts: Option<BTreeMap<String, MultipartPart>>,
    that: Option<ThatPredicate>,
    on_match: Option<MatchCallback>,
    responses: ResponseQueue,
    calls: Vec<RequestPattern>,
}

impl RequestPattern {
    pub fn new() -> Self {
        Self::default()
    }

    // ===== Request dimensions =====

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    /// Pin a literal URI. A query string is split off into the query params;
    /// a bare trailing `?` is dropped without touching them.
    pub fn uri(mut self, uri: &str) -> Self {
        match uri.split_once('?') {
            None => self.uri = Some(UriMatcher::Literal(uri.to_string())),
            Some((path, query)) => {
                self.uri = Some(UriMatcher::Literal(path.to_string()));
                let parsed = parse_encoded_params(query);
                if !parsed.is_empty() {
                    self.query_params.get_or_insert_with(BTreeMap::new).extend(parsed);
                }
            }
        }
        self
    }

    /// Match the URI with a custom predicate instead of a literal.
    pub fn uri_matching<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&str, &BTreeMap<String, String>) -> bool + Send + Sync + 'static,
    {
        self.uri = Some(UriMatcher::predicate(predicate));
        self
    }

    pub fn uri_matcher(mut self, matcher: UriMatcher) -> Self {
        self.uri = Some(matcher);
        self
    }

    /// Set a value for a `{key}` placeholder. Requires a URI to be configured first.
    pub fn uri_param(mut self, key: &str, value: impl ToString) -> Result<Self, MockError> {
        if self.uri.is_none() {
            return Err(MockError::NoUriConfigured {
                key: key.to_string(),
            });
        }
        self.uri_params.insert(key.to_string(), value.to_string());
        Ok(self)
    }

    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(BTreeMap::new)
            .insert(normalize_header_name(name), value.into());
        self
    }

    pub fn basic_authentication(self, username: &str, password: &str) -> Self {
        let token = BASE64.encode(format!("{username}:{password}"));
        self.header(AUTHORIZATION.as_str(), format!("Basic {token}"))
    }

    pub fn query_param(mut self, key: &str, value: impl Into<String>) -> Self {
        self.query_params
            .get_or_insert_with(BTreeMap::new)
            .insert(key.to_string(), value.into());
        self
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.set_content(Some(content.into()));
        self
    }

    pub fn json(self, data: &serde_json::Value) -> Self {
        self.content(data.to_string())
    }

    /// Set an XML body, rejecting content that is not well-formed.
    pub fn xml(self, data: &str) -> Result<Self, MockError> {
        if !is_xml(data) {
            return Err(MockError::MalformedMockRequest(data.to_string()));
        }
        Ok(self.content(data))
    }

    /// Append a form-encoded `key=value` pair to the body.
    pub fn request_param(mut self, key: &str, value: &str) -> Self {
        let mut content = self.content.take().unwrap_or_default();
        if !content.is_empty() {
            content.push('&');
        }
        content.push_str(&encode_component(key));
        content.push('=');
        content.push_str(&encode_component(value));
        self.set_content(Some(content));
        self
    }

    pub fn multipart_file(
        mut self,
        name: &str,
        filename: Option<&str>,
        mimetype: &str,
        size: u64,
    ) -> Self {
        self.multiparts
            .get_or_insert_with(BTreeMap::new)
            .insert(name.to_string(), MultipartPart::new(filename, mimetype, size));
        self
    }

    pub fn that<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&RequestPattern, &RequestPattern) -> Option<String> + Send + Sync + 'static,
    {
        self.that = Some(ThatPredicate(Arc::new(predicate)));
        self
    }

    /// Run `callback` with every real request recorded on this pattern.
    ///
    /// The callback runs after the registry has released the call, so it may use
    /// a `SharedRegistry` handle of its own.
    pub fn on_match<F>(mut self, callback: F) -> Self
    where
        F: Fn(&RequestPattern) + Send + Sync + 'static,
    {
        self.on_match = Some(MatchCallback(Arc::new(callback)));
        self
    }

    fn set_content(&mut self, content: Option<String>) {
        self.content = content;
        self.content_kind = OnceCell::new();
    }

    // ===== Responses =====

    pub fn will_respond(mut self, response: MockResponse) -> Result<Self, MockError> {
        self.push_response(response)?;
        Ok(self)
    }

    pub fn will_always_respond(mut self, response: MockResponse) -> Result<Self, MockError> {
        self.push_always(response)?;
        Ok(self)
    }

    pub fn will_throw<E>(self, error: E) -> Result<Self, MockError>
    where
        E: Error + Send + Sync + 'static,
    {
        self.will_throw_shared(Arc::new(error))
    }

    pub fn will_throw_shared(mut self, error: ConfiguredError) -> Result<Self, MockError> {
        self.push_response(error)?;
        Ok(self)
    }

    pub fn will_always_throw<E>(self, error: E) -> Result<Self, MockError>
    where
        E: Error + Send + Sync + 'static,
    {
        self.will_always_throw_shared(Arc::new(error))
    }

    pub fn will_always_throw_shared(mut self, error: ConfiguredError) -> Result<Self, MockError> {
        self.push_always(error)?;
        Ok(self)
    }

    /// Append a sequential response or error to an existing pattern.
    pub fn push_response(&mut self, item: impl Into<QueueItem>) -> Result<&mut Self, MockError> {
        self.responses
            .add(item)
            .map_err(|e| MockError::from_queue(e, &*self))?;
        Ok(self)
    }

    /// Set the single repeated response or error of an existing pattern.
    pub fn push_always(&mut self, item: impl Into<QueueItem>) -> Result<&mut Self, MockError> {
        self.responses
            .add_always(item)
            .map_err(|e| MockError::from_queue(e, &*self))?;
        Ok(self)
    }

    pub fn next_response(&mut self) -> Result<QueueItem, MockError> {
        self.responses
            .next()
            .map_err(|e| MockError::from_queue(e, &*self))
    }

    pub fn has_response(&self) -> bool {
        !self.responses.is_empty()
    }

    pub fn has_next_response(&self) -> bool {
        self.responses.has_next()
    }

    pub fn reset_responses(&mut self) -> &mut Self {
        self.responses.reset();
        self
    }

    pub fn responses(&self) -> &ResponseQueue {
        &self.responses
    }

    // ===== Call history =====

    /// Record a real request matched by this pattern.
    pub fn called(&mut self, request: RequestPattern) -> &mut Self {
        self.calls.push(request);
        self
    }

    pub fn calls(&self) -> &[RequestPattern] {
        &self.calls
    }

    pub fn call_stack(&self) -> CallStack {
        CallStack::new(self.calls.clone())
    }

    pub fn reset_calls(&mut self) -> &mut Self {
        self.calls.clear();
        self
    }

    pub fn match_callback(&self) -> Option<&MatchCallback> {
        self.on_match.as_ref()
    }

    // ===== Accessors =====

    pub fn http_method(&self) -> Option<&str> {
        self.method.as_deref()
    }

    pub fn uri_matcher_ref(&self) -> Option<&UriMatcher> {
        self.uri.as_ref()
    }

    pub fn has_uri(&self) -> bool {
        self.uri.is_some()
    }

    /// The literal URI with placeholders substituted; `None` for predicate URIs.
    pub fn resolved_uri(&self) -> Option<String> {
        match &self.uri {
            Some(UriMatcher::Literal(template)) => {
                Some(replace_uri_params(template, &self.uri_params))
            }
            _ => None,
        }
    }

    pub fn uri_params(&self) -> &BTreeMap<String, String> {
        &self.uri_params
    }

    pub fn has_uri_params(&self) -> bool {
        !self.uri_params.is_empty()
    }

    pub fn headers(&self) -> Option<&BTreeMap<String, String>> {
        self.headers.as_ref()
    }

    pub fn has_headers(&self) -> bool {
        self.headers.is_some()
    }

    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .as_ref()?
            .get(&normalize_header_name(name))
            .map(String::as_str)
    }

    pub fn has_header(&self, name: &str) -> bool {
        self.header_value(name).is_some()
    }

    pub fn query_params(&self) -> Option<&BTreeMap<String, String>> {
        self.query_params.as_ref()
    }

    pub fn has_query_params(&self) -> bool {
        self.query_params.is_some()
    }

    pub fn body(&self) -> Option<&str> {
        self.content.as_deref()
    }

    pub fn has_content(&self) -> bool {
        self.content.is_some()
    }

    /// Kind of the body, computed on first use.
    pub fn content_kind(&self) -> ContentKind {
        *self
            .content_kind
            .get_or_init(|| ContentKind::detect(self.content.as_deref()))
    }

    pub fn is_json(&self) -> bool {
        self.content.as_deref().is_some_and(is_json)
    }

    pub fn json_value(&self) -> Option<serde_json::Value> {
        serde_json::from_str(self.content.as_deref()?).ok()
    }

    pub fn is_xml(&self) -> bool {
        self.content.as_deref().is_some_and(is_xml)
    }

    /// The body parsed as an XML document.
    pub fn xml_document(&self) -> Option<sxd_document::Package> {
        sxd_document::parser::parse(self.content.as_deref()?).ok()
    }

    /// The body as canonical XML, if it is well-formed.
    pub fn xml_canonical(&self) -> Option<String> {
        canonical_xml(self.content.as_deref()?)
    }

    /// Evaluate an XPath expression against an XML body.
    pub fn xml_xpath(&self, path: &str, namespaces: &[(&str, &str)]) -> Option<String> {
        extract_xpath(self.content.as_deref()?, path, namespaces)
    }

    /// Whether the body has the `key=value(&key=value)*` shape and is not JSON.
    pub fn has_form_params(&self) -> bool {
        self.content
            .as_deref()
            .is_some_and(|content| has_form_shape(content) && !is_json(content))
    }

    /// The body decoded as form parameters.
    pub fn request_params(&self) -> BTreeMap<String, String> {
        parse_encoded_params(self.content.as_deref().unwrap_or_default())
    }

    pub fn multiparts(&self) -> Option<&BTreeMap<String, MultipartPart>> {
        self.multiparts.as_ref()
    }

    pub fn has_multiparts(&self) -> bool {
        self.multiparts.as_ref().is_some_and(|m| !m.is_empty())
    }

    pub fn that_predicate(&self) -> Option<&ThatPredicate> {
        self.that.as_ref()
    }

    /// A pattern with no method, URI, headers, content or multiparts matches anything.
    pub fn is_empty(&self) -> bool {
        self.method.is_none()
            && self.uri.is_none()
            && self.headers.is_none()
            && self.content.is_none()
            && self.multiparts.is_none()
    }
}
