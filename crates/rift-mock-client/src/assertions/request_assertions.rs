use super::{Failer, PanicFailer};
use crate::pattern::RequestPattern;
use crate::registry::PatternRegistry;
use serde_json::Value;
use std::collections::BTreeMap;

/// Assertions over the calls recorded on a pattern.
///
/// Each `called_with_*` helper fails when the pattern was never called, then
/// checks every recorded call.
#[derive(Debug, Clone, Default)]
pub struct RequestAssertions<F: Failer = PanicFailer> {
    failer: F,
    message: Option<String>,
}

impl RequestAssertions<PanicFailer> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<F: Failer> RequestAssertions<F> {
    pub fn with_failer(failer: F) -> Self {
        Self {
            failer,
            message: None,
        }
    }

    /// Prefix every failure with a custom message.
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into()).filter(|m| !m.is_empty());
        self
    }

    fn fail(&self, detail: String) -> ! {
        let message = match &self.message {
            Some(prefix) => format!("{}. {detail}", capitalize(prefix)),
            None => detail,
        };
        self.failer.fail(message)
    }

    fn calls<'a>(&self, pattern: &'a RequestPattern) -> &'a [RequestPattern] {
        let calls = pattern.calls();
        if calls.is_empty() {
            self.fail(format!("Request not called: {pattern}"));
        }
        calls
    }

    pub fn called_with_json(&self, expected: &Value, pattern: &RequestPattern) {
        for call in self.calls(pattern) {
            if call.json_value().as_ref() != Some(expected) {
                self.fail(format!(
                    "Request not called with expected json data {expected}: {call}"
                ));
            }
        }
    }

    pub fn called_with_request_params(
        &self,
        expected: &BTreeMap<String, String>,
        pattern: &RequestPattern,
    ) {
        for call in self.calls(pattern) {
            if &call.request_params() != expected {
                self.fail(format!(
                    "Request not called with expected request parameters: {call}"
                ));
            }
        }
    }

    pub fn called_with_query_params(
        &self,
        expected: &BTreeMap<String, String>,
        pattern: &RequestPattern,
    ) {
        for call in self.calls(pattern) {
            if call.query_params() != Some(expected) {
                self.fail(format!(
                    "Request not called with expected query parameters: {call}"
                ));
            }
        }
    }

    pub fn called_with_query_param(&self, name: &str, expected: &str, pattern: &RequestPattern) {
        for call in self.calls(pattern) {
            let Some(query_params) = call.query_params() else {
                self.fail(format!("Request called without parameters: {call}"));
            };
            match query_params.get(name) {
                None => self.fail(format!(
                    "Request not called with expected query parameter \"{name}\": {call}"
                )),
                Some(value) if value != expected => self.fail(format!(
                    "Request not called with expected query parameter value \"{name}\": {call}"
                )),
                Some(_) => {}
            }
        }
    }

    pub fn called_with_content(&self, expected: &str, pattern: &RequestPattern) {
        for call in self.calls(pattern) {
            if call.body() != Some(expected) {
                self.fail(format!("Request not called with expected content: {call}"));
            }
        }
    }

    pub fn called_with_file(
        &self,
        name: &str,
        filename: &str,
        size: u64,
        pattern: &RequestPattern,
    ) {
        for call in self.calls(pattern) {
            let Some(part) = call.multiparts().and_then(|parts| parts.get(name)) else {
                self.fail(format!("Request not called with file \"{name}\": {call}"));
            };
            if part.filename.as_deref() != Some(filename) {
                self.fail(format!(
                    "Request not called with expected filename \"{filename}\": {call}"
                ));
            }
            if part.size != size {
                self.fail(format!(
                    "Request not called with expected file size \"{size}\": {call}"
                ));
            }
        }
    }

    pub fn called_with_header_containing(
        &self,
        header: &str,
        substring: &str,
        pattern: &RequestPattern,
    ) {
        for call in self.calls(pattern) {
            if !call.header_value(header).is_some_and(|v| v.contains(substring)) {
                self.fail(format!("Request not called with expected header: {call}"));
            }
        }
    }

    pub fn called_with_header_not_containing(
        &self,
        header: &str,
        substring: &str,
        pattern: &RequestPattern,
    ) {
        for call in self.calls(pattern) {
            if call.header_value(header).is_some_and(|v| v.contains(substring)) {
                self.fail(format!("Request not called with expected header: {call}"));
            }
        }
    }

    pub fn called_with_header_same(&self, header: &str, expected: &str, pattern: &RequestPattern) {
        for call in self.calls(pattern) {
            if call.header_value(header) != Some(expected) {
                self.fail(format!("Request not called with expected header: {call}"));
            }
        }
    }

    pub fn called_without_header(&self, header: &str, pattern: &RequestPattern) {
        for call in self.calls(pattern) {
            if call.has_header(header) {
                self.fail(format!(
                    "Request not called without expected header: {call}"
                ));
            }
        }
    }

    pub fn called_times(&self, expected: usize, pattern: &RequestPattern) {
        let actual = pattern.calls().len();
        if actual != expected {
            self.fail(format!(
                "Request not called expected times ({expected}, got {actual}): {pattern}"
            ));
        }
    }

    pub fn not_called(&self, pattern: &RequestPattern) {
        if !pattern.calls().is_empty() {
            self.fail(format!("Request unexpectedly called: {pattern}"));
        }
    }

    /// Every registered pattern must have been called at least once.
    pub fn all_called(&self, registry: &PatternRegistry) {
        for pattern in registry {
            self.calls(pattern);
        }
    }
}

fn capitalize(message: &str) -> String {
    let mut chars = message.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
