//! Normalization of intercepted calls into `RequestPattern`s.

use crate::error::MockError;
use crate::headers::{split_header_line, CONTENT_TYPE, MIME_FORM, MIME_JSON};
use crate::pattern::{encoded_pairs, has_form_shape, RequestPattern};
use bytes::Bytes;
use serde_json::Value;
use tracing::debug;

const MIME_MULTIPART: &str = "multipart/form-data";

/// Raw request body as handed over by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    Text(String),
    Bytes(Bytes),
}

impl RequestBody {
    fn into_text(self) -> Result<String, MockError> {
        match self {
            RequestBody::Text(text) => Ok(text),
            RequestBody::Bytes(bytes) => {
                String::from_utf8(bytes.to_vec()).map_err(|_| MockError::UnprocessableBody)
            }
        }
    }
}

impl From<&str> for RequestBody {
    fn from(text: &str) -> Self {
        RequestBody::Text(text.to_string())
    }
}

impl From<String> for RequestBody {
    fn from(text: String) -> Self {
        RequestBody::Text(text)
    }
}

impl From<Bytes> for RequestBody {
    fn from(bytes: Bytes) -> Self {
        RequestBody::Bytes(bytes)
    }
}

impl From<Vec<u8>> for RequestBody {
    fn from(bytes: Vec<u8>) -> Self {
        RequestBody::Bytes(Bytes::from(bytes))
    }
}

/// A multipart field already split out of the body by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartField {
    pub name: String,
    pub filename: Option<String>,
    pub mimetype: String,
    pub size: u64,
}

impl MultipartField {
    pub fn file(name: &str, filename: &str, mimetype: &str, size: u64) -> Self {
        Self {
            name: name.to_string(),
            filename: Some(filename.to_string()),
            mimetype: mimetype.to_string(),
            size,
        }
    }

    pub fn data(name: &str, mimetype: &str, size: u64) -> Self {
        Self {
            name: name.to_string(),
            filename: None,
            mimetype: mimetype.to_string(),
            size,
        }
    }
}

/// Transport options of an intercepted call.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Header lines in `Name: value` form.
    pub headers: Vec<String>,
    pub json: Option<Value>,
    pub body: Option<RequestBody>,
    pub multiparts: Vec<MultipartField>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push(format!("{name}: {value}"));
        self
    }

    pub fn json(mut self, json: Value) -> Self {
        self.json = Some(json);
        self
    }

    pub fn body(mut self, body: impl Into<RequestBody>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn multipart(mut self, field: MultipartField) -> Self {
        self.multiparts.push(field);
        self
    }
}

/// Builds the pattern representation of a real call.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestFactory;

impl RequestFactory {
    pub fn new() -> Self {
        Self
    }

    pub fn create(
        &self,
        method: &str,
        url: &str,
        options: &RequestOptions,
    ) -> Result<RequestPattern, MockError> {
        let mut request = RequestPattern::new().method(method).uri(url);

        for line in &options.headers {
            match split_header_line(line) {
                Some((name, value)) => request = request.header(name, value),
                None => debug!(header = %line, "Skipping malformed header line"),
            }
        }

        if let Some(json) = &options.json {
            request = request.json(json);
        }

        if let Some(body) = options.body.clone() {
            request = apply_body(request, body.into_text()?);
        }

        for field in &options.multiparts {
            request = request.multipart_file(
                &field.name,
                field.filename.as_deref(),
                &field.mimetype,
                field.size,
            );
        }

        Ok(request)
    }
}

fn apply_body(request: RequestPattern, body: String) -> RequestPattern {
    let content_type = request
        .header_value(CONTENT_TYPE.as_str())
        .unwrap_or_default()
        .to_string();

    if content_type.starts_with(MIME_JSON) {
        return match serde_json::from_str::<Value>(&body) {
            Ok(json) => request.json(&json),
            Err(error) => {
                debug!(%error, "Declared JSON body does not decode, keeping raw content");
                request.content(body)
            }
        };
    }

    if content_type.starts_with(MIME_FORM) && has_form_shape(&body) {
        return encoded_pairs(&body)
            .fold(request, |request, (key, value)| request.request_param(&key, &value));
    }

    if content_type.starts_with(MIME_MULTIPART) {
        return request;
    }

    request.content(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::MultipartKind;
    use serde_json::json;

    #[test]
    fn test_method_uri_and_query() {
        let request = RequestFactory::new()
            .create("GET", "/users?page=2", &RequestOptions::new())
            .unwrap();

        assert_eq!(request.http_method(), Some("GET"));
        assert_eq!(request.resolved_uri().as_deref(), Some("/users"));
        assert_eq!(request.query_params().unwrap()["page"], "2");
        assert!(!request.has_content());
    }

    #[test]
    fn test_header_lines() {
        let options = RequestOptions::new()
            .header("Accept", "application/json")
            .header("X-Empty", "");
        let request = RequestFactory::new().create("GET", "/", &options).unwrap();

        assert_eq!(request.header_value("accept"), Some("application/json"));
        assert_eq!(request.header_value("x-empty"), Some(""));
    }

    #[test]
    fn test_json_option() {
        let options = RequestOptions::new().json(json!({"a": 1}));
        let request = RequestFactory::new().create("POST", "/", &options).unwrap();

        assert!(request.is_json());
        assert_eq!(request.json_value(), Some(json!({"a": 1})));
    }

    #[test]
    fn test_json_body_by_content_type() {
        let options = RequestOptions::new()
            .header("Content-Type", "application/json; charset=utf-8")
            .body(r#"{ "a" : 1 }"#);
        let request = RequestFactory::new().create("POST", "/", &options).unwrap();

        assert_eq!(request.body(), Some(r#"{"a":1}"#));
    }

    #[test]
    fn test_form_body_becomes_request_params() {
        let options = RequestOptions::new()
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body("name=Jane+Doe&city=K%C3%B6ln");
        let request = RequestFactory::new().create("POST", "/", &options).unwrap();

        let params = request.request_params();
        assert_eq!(params["name"], "Jane Doe");
        assert_eq!(params["city"], "Köln");
        assert!(request.has_form_params());
    }

    #[test]
    fn test_form_body_keeps_wire_order() {
        let factory = RequestFactory::new();
        let form = |body: &str| {
            let options = RequestOptions::new()
                .header("Content-Type", "application/x-www-form-urlencoded")
                .body(body);
            factory.create("POST", "/", &options).unwrap()
        };

        assert_eq!(form("b=2&a=1").body(), Some("b=2&a=1"));
        assert_eq!(form("tag=x&tag=y").body(), Some("tag=x&tag=y"));
    }

    #[test]
    fn test_plain_body() {
        let options = RequestOptions::new().body("just text");
        let request = RequestFactory::new().create("PUT", "/", &options).unwrap();
        assert_eq!(request.body(), Some("just text"));
    }

    #[test]
    fn test_byte_body() {
        let options = RequestOptions::new().body(Bytes::from_static(b"raw"));
        let request = RequestFactory::new().create("PUT", "/", &options).unwrap();
        assert_eq!(request.body(), Some("raw"));
    }

    #[test]
    fn test_non_utf8_body_is_unprocessable() {
        let options = RequestOptions::new().body(vec![0xff, 0xfe, 0x00]);
        let error = RequestFactory::new().create("PUT", "/", &options).unwrap_err();
        assert!(matches!(error, MockError::UnprocessableBody));
    }

    #[test]
    fn test_multipart_fields() {
        let options = RequestOptions::new()
            .header("Content-Type", "multipart/form-data; boundary=xyz")
            .body("--xyz--")
            .multipart(MultipartField::file("upload", "a.txt", "text/plain", 3))
            .multipart(MultipartField::data("comment", "text/plain", 5));
        let request = RequestFactory::new().create("POST", "/upload", &options).unwrap();

        let multiparts = request.multiparts().unwrap();
        assert_eq!(multiparts["upload"].kind, MultipartKind::File);
        assert_eq!(multiparts["upload"].filename.as_deref(), Some("a.txt"));
        assert_eq!(multiparts["comment"].kind, MultipartKind::Data);
        assert!(!request.has_content());
    }
}
