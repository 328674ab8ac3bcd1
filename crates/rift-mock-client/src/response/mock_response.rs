//! Fluent builder for canned responses.

use crate::headers::{
    canonical_header_name, normalize_header_name, CONTENT_LENGTH, CONTENT_TYPE, ETAG, MIME_JSON,
    MIME_XML,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A canned response: optional status code, headers (lowercased names) and body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MockResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    status_code: Option<u16>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    headers: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content: Option<String>,
}

impl MockResponse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status_code(mut self, code: u16) -> Self {
        self.status_code = Some(code);
        self
    }

    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(normalize_header_name(name), value.into());
        self
    }

    pub fn content_type(self, content_type: &str) -> Self {
        self.header(CONTENT_TYPE.as_str(), content_type)
    }

    pub fn content_length(self, length: usize) -> Self {
        self.header(CONTENT_LENGTH.as_str(), length.to_string())
    }

    pub fn etag(self, etag: &str) -> Self {
        self.header(ETAG.as_str(), etag)
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Serve a JSON body with `Content-Type: application/json`.
    pub fn json(self, data: &serde_json::Value) -> Self {
        self.content_type(MIME_JSON).content(data.to_string())
    }

    /// Serve an XML body with `Content-Type: text/xml`.
    pub fn xml(self, data: impl Into<String>) -> Self {
        self.content_type(MIME_XML).content(data)
    }

    pub fn code(&self) -> Option<u16> {
        self.status_code
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&normalize_header_name(name))
            .map(String::as_str)
    }

    pub fn has_header(&self, name: &str) -> bool {
        self.headers.contains_key(&normalize_header_name(name))
    }

    pub fn body(&self) -> Option<&str> {
        self.content.as_deref()
    }

    pub fn has_content(&self) -> bool {
        self.content.is_some()
    }

    /// Decode the body as JSON, if there is one and it parses.
    pub fn json_body(&self) -> Option<serde_json::Value> {
        self.content
            .as_deref()
            .and_then(|content| serde_json::from_str(content).ok())
    }
}

impl fmt::Display for MockResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rendered = String::new();

        if let Some(code) = self.status_code {
            rendered.push_str(&format!("HTTP Code: {code}"));
        }

        for (name, value) in &self.headers {
            rendered.push_str(&format!("\n{}: {}", canonical_header_name(name), value));
        }

        if let Some(content) = &self.content {
            if !rendered.is_empty() {
                rendered.push_str("\n\n");
            }
            rendered.push_str(content);
        }

        f.write_str(rendered.trim())
    }
}
