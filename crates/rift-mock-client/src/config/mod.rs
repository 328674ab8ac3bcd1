//! Fixture files declaring request patterns.
//!
//! ```yaml
//! patterns:
//!   - method: GET
//!     uri: /users/{id}
//!     uriParams: { id: 42 }
//!     responses:
//!       - statusCode: 200
//!         json: { name: Jane }
//! ```

mod pattern;

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::MockError;
use crate::pattern::RequestPattern;

pub use pattern::{BasicAuthConfig, MultipartConfig, PatternConfig, ResponseConfig};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MockConfig {
    #[serde(default)]
    pub patterns: Vec<PatternConfig>,
}

impl MockConfig {
    /// Load a fixture file. `.json` files are read as JSON, anything else as YAML.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, anyhow::Error> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read mock fixture {}", path.display()))?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let config = if is_json {
            Self::from_json_str(&contents)
        } else {
            Self::from_yaml_str(&contents)
        };
        config.with_context(|| format!("Invalid mock fixture {}", path.display()))
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self, anyhow::Error> {
        let config: MockConfig = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(contents: &str) -> Result<Self, anyhow::Error> {
        let config: MockConfig = serde_json::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        for (index, pattern) in self.patterns.iter().enumerate() {
            if pattern
                .method
                .as_deref()
                .is_some_and(|method| method.trim().is_empty())
            {
                anyhow::bail!("Pattern #{index}: method must not be empty");
            }

            if pattern.body_kinds() > 1 {
                anyhow::bail!(
                    "Pattern #{index}: only one of 'json', 'content', 'xml' or 'requestParams' may be set"
                );
            }

            if pattern.always && pattern.responses.len() > 1 {
                anyhow::bail!(
                    "Pattern #{index}: 'always' allows a single response, got {}",
                    pattern.responses.len()
                );
            }

            if !pattern.uri_params.is_empty() && pattern.uri.is_none() {
                anyhow::bail!("Pattern #{index}: 'uriParams' requires 'uri'");
            }

            for (response_index, response) in pattern.responses.iter().enumerate() {
                if response.body_kinds() > 1 {
                    anyhow::bail!(
                        "Pattern #{index}, response #{response_index}: only one of 'json', 'body', 'xml' or 'error' may be set"
                    );
                }
                if response.error.is_some()
                    && (response.status_code.is_some() || !response.headers.is_empty())
                {
                    anyhow::bail!(
                        "Pattern #{index}, response #{response_index}: an 'error' response takes no status code or headers"
                    );
                }
            }
        }

        Ok(())
    }

    /// Build every declared pattern, in declaration order.
    pub fn into_patterns(self) -> Result<Vec<RequestPattern>, MockError> {
        self.patterns
            .into_iter()
            .map(PatternConfig::into_pattern)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::MultipartKind;
    use serde_json::json;

    #[test]
    fn test_parse_yaml_config() {
        let yaml = r#"
patterns:
  - method: GET
    uri: /users/{id}?expand=1
    uriParams: { id: 42 }
    headers: { Accept: application/json }
    queryParams: { page: 1 }
    basicAuth: { username: username, password: password }
    responses:
      - statusCode: 200
        headers: { ETag: abc }
        json: { ok: true }
  - method: POST
    uri: /upload
    multiparts:
      file: { filename: a.txt, mimetype: text/plain, size: 3 }
    always: true
    responses:
      - error: upstream unavailable
"#;

        let config = MockConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.patterns.len(), 2);
        assert_eq!(config.patterns[0].uri_params["id"], "42");
        assert!(config.patterns[1].always);

        let patterns = config.into_patterns().unwrap();
        let users = &patterns[0];
        assert_eq!(users.resolved_uri().as_deref(), Some("/users/42"));
        assert_eq!(users.query_params().unwrap()["expand"], "1");
        assert_eq!(users.query_params().unwrap()["page"], "1");
        assert_eq!(users.header_value("accept"), Some("application/json"));
        assert_eq!(
            users.header_value("authorization"),
            Some("Basic dXNlcm5hbWU6cGFzc3dvcmQ=")
        );
        assert!(users.has_next_response());

        let upload = &patterns[1];
        assert_eq!(
            upload.multiparts().unwrap()["file"].kind,
            MultipartKind::File
        );
        assert!(upload.has_next_response());
    }

    #[test]
    fn test_parse_json_config() {
        let json = r#"{"patterns": [{"method": "PUT", "requestParams": {"a": "1"},
            "responses": [{"statusCode": 204}, {"body": "done"}]}]}"#;

        let mut patterns = MockConfig::from_json_str(json)
            .unwrap()
            .into_patterns()
            .unwrap();
        let pattern = &mut patterns[0];

        assert_eq!(pattern.body(), Some("a=1"));
        assert_eq!(pattern.responses().len(), 2);

        let first = pattern.next_response().unwrap();
        assert_eq!(first.as_response().and_then(|r| r.code()), Some(204));
        let second = pattern.next_response().unwrap();
        assert_eq!(second.as_response().and_then(|r| r.body()), Some("done"));
    }

    #[test]
    fn test_response_headers_override_implied_content_type() {
        let response = ResponseConfig {
            json: Some(json!({"a": 1})),
            headers: [("Content-Type".to_string(), "application/hal+json".to_string())]
                .into_iter()
                .collect(),
            ..Default::default()
        }
        .into_response();

        assert_eq!(response.header_value("content-type"), Some("application/hal+json"));
        assert_eq!(response.body(), Some(r#"{"a":1}"#));
    }

    #[test]
    fn test_rejects_multiple_body_kinds() {
        let yaml = r#"
patterns:
  - content: plain
    json: { a: 1 }
"#;
        let error = MockConfig::from_yaml_str(yaml).unwrap_err();
        assert!(error.to_string().contains("only one of"));
    }

    #[test]
    fn test_rejects_always_with_many_responses() {
        let yaml = r#"
patterns:
  - method: GET
    always: true
    responses:
      - statusCode: 200
      - statusCode: 500
"#;
        let error = MockConfig::from_yaml_str(yaml).unwrap_err();
        assert!(error.to_string().contains("'always' allows a single response"));
    }

    #[test]
    fn test_rejects_empty_method() {
        let error = MockConfig::from_yaml_str("patterns:\n  - method: ''\n").unwrap_err();
        assert!(error.to_string().contains("method must not be empty"));
    }

    #[test]
    fn test_rejects_unknown_fields() {
        assert!(MockConfig::from_yaml_str("patterns:\n  - path: /foo\n").is_err());
    }

    #[test]
    fn test_rejects_nested_values_in_maps() {
        let yaml = "patterns:\n  - headers: { accept: [a, b] }\n";
        assert!(MockConfig::from_yaml_str(yaml).is_err());
    }

    #[test]
    fn test_malformed_xml_surfaces_builder_error() {
        let config = MockConfig::from_yaml_str("patterns:\n  - xml: 'not xml'\n").unwrap();
        let error = config.into_patterns().unwrap_err();
        assert_eq!(error.to_string(), "No valid xml: not xml");
    }

    #[test]
    fn test_from_file_picks_format_by_extension() {
        let dir = tempfile::tempdir().unwrap();

        let yaml_path = dir.path().join("mocks.yaml");
        std::fs::write(&yaml_path, "patterns:\n  - method: GET\n").unwrap();
        assert_eq!(MockConfig::from_file(&yaml_path).unwrap().patterns.len(), 1);

        let json_path = dir.path().join("mocks.json");
        std::fs::write(&json_path, r#"{"patterns": [{"method": "GET"}, {}]}"#).unwrap();
        assert_eq!(MockConfig::from_file(&json_path).unwrap().patterns.len(), 2);
    }

    #[test]
    fn test_from_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.yaml");
        let error = MockConfig::from_file(&missing).unwrap_err();
        assert!(format!("{error:#}").contains("missing.yaml"));
    }
}
