//! Fixture entries for request patterns and their responses.

use crate::error::{FixtureError, MockError};
use crate::pattern::RequestPattern;
use crate::response::MockResponse;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// One expected request and the responses it produces.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PatternConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,

    /// Literal URI; a query string is split into query params.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,

    #[serde(
        default,
        deserialize_with = "scalar_map",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub uri_params: BTreeMap<String, String>,

    #[serde(
        default,
        deserialize_with = "scalar_map",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub headers: BTreeMap<String, String>,

    #[serde(
        default,
        deserialize_with = "scalar_map",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub query_params: BTreeMap<String, String>,

    // ===== Body: at most one of these =====
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xml: Option<String>,
    #[serde(
        default,
        deserialize_with = "scalar_map",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub request_params: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basic_auth: Option<BasicAuthConfig>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub multiparts: BTreeMap<String, MultipartConfig>,

    /// Repeat the single response for every call instead of consuming it.
    #[serde(default)]
    pub always: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub responses: Vec<ResponseConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BasicAuthConfig {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MultipartConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    pub mimetype: String,
    pub size: u64,
}

/// A canned response, or an `error` to raise instead.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ResponseConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(
        default,
        deserialize_with = "scalar_map",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub headers: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xml: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PatternConfig {
    pub(super) fn body_kinds(&self) -> usize {
        [
            self.json.is_some(),
            self.content.is_some(),
            self.xml.is_some(),
            !self.request_params.is_empty(),
        ]
        .into_iter()
        .filter(|set| *set)
        .count()
    }

    /// Build the pattern, surfacing builder errors.
    pub fn into_pattern(self) -> Result<RequestPattern, MockError> {
        let mut pattern = RequestPattern::new();

        if let Some(method) = self.method {
            pattern = pattern.method(method);
        }
        if let Some(uri) = &self.uri {
            pattern = pattern.uri(uri);
        }
        for (key, value) in &self.uri_params {
            pattern = pattern.uri_param(key, value)?;
        }
        for (name, value) in self.headers {
            pattern = pattern.header(&name, value);
        }
        if let Some(auth) = &self.basic_auth {
            pattern = pattern.basic_authentication(&auth.username, &auth.password);
        }
        for (key, value) in self.query_params {
            pattern = pattern.query_param(&key, value);
        }

        if let Some(json) = &self.json {
            pattern = pattern.json(json);
        }
        if let Some(content) = self.content {
            pattern = pattern.content(content);
        }
        if let Some(xml) = &self.xml {
            pattern = pattern.xml(xml)?;
        }
        for (key, value) in &self.request_params {
            pattern = pattern.request_param(key, value);
        }

        for (name, part) in &self.multiparts {
            pattern =
                pattern.multipart_file(name, part.filename.as_deref(), &part.mimetype, part.size);
        }

        for response in self.responses {
            let error = response.error.clone();
            match (error, self.always) {
                (Some(message), false) => {
                    pattern = pattern.will_throw_shared(Arc::new(FixtureError(message)))?
                }
                (Some(message), true) => {
                    pattern = pattern.will_always_throw_shared(Arc::new(FixtureError(message)))?
                }
                (None, false) => pattern = pattern.will_respond(response.into_response())?,
                (None, true) => pattern = pattern.will_always_respond(response.into_response())?,
            }
        }

        Ok(pattern)
    }
}

impl ResponseConfig {
    pub(super) fn body_kinds(&self) -> usize {
        [
            self.json.is_some(),
            self.body.is_some(),
            self.xml.is_some(),
            self.error.is_some(),
        ]
        .into_iter()
        .filter(|set| *set)
        .count()
    }

    pub fn into_response(self) -> MockResponse {
        let mut response = MockResponse::new();

        if let Some(code) = self.status_code {
            response = response.status_code(code);
        }
        if let Some(json) = &self.json {
            response = response.json(json);
        }
        if let Some(xml) = self.xml {
            response = response.xml(xml);
        }
        if let Some(body) = self.body {
            response = response.content(body);
        }
        // Explicit headers win over the ones implied by json/xml.
        for (name, value) in self.headers {
            response = response.header(&name, value);
        }

        response
    }
}

/// Accept strings, numbers and booleans as map values.
fn scalar_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, Value>::deserialize(deserializer)?;
    raw.into_iter()
        .map(|(key, value)| match value {
            Value::String(s) => Ok((key, s)),
            Value::Number(n) => Ok((key, n.to_string())),
            Value::Bool(b) => Ok((key, b.to_string())),
            other => Err(serde::de::Error::custom(format!(
                "expected a scalar value for '{key}', got {other}"
            ))),
        })
        .collect()
}
