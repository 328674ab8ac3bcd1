//! Multipart field descriptions.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MultipartKind {
    File,
    Data,
}

impl MultipartKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MultipartKind::File => "file",
            MultipartKind::Data => "data",
        }
    }
}

/// One multipart field: uploaded files carry a filename, plain data fields don't.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultipartPart {
    #[serde(rename = "type")]
    pub kind: MultipartKind,
    pub filename: Option<String>,
    pub mimetype: String,
    pub size: u64,
}

impl MultipartPart {
    pub fn new(filename: Option<&str>, mimetype: &str, size: u64) -> Self {
        Self {
            kind: if filename.is_some() {
                MultipartKind::File
            } else {
                MultipartKind::Data
            },
            filename: filename.map(str::to_string),
            mimetype: mimetype.to_string(),
            size,
        }
    }

    pub fn to_value(&self) -> Value {
        json!({
            "type": self.kind.as_str(),
            "filename": self.filename,
            "mimetype": self.mimetype,
            "size": self.size,
        })
    }
}

pub fn multiparts_to_value(multiparts: &BTreeMap<String, MultipartPart>) -> Value {
    Value::Object(
        multiparts
            .iter()
            .map(|(name, part)| (name.clone(), part.to_value()))
            .collect::<Map<String, Value>>(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_follows_filename() {
        assert_eq!(
            MultipartPart::new(Some("a.txt"), "text/plain", 3).kind,
            MultipartKind::File
        );
        assert_eq!(
            MultipartPart::new(None, "text/plain", 3).kind,
            MultipartKind::Data
        );
    }

    #[test]
    fn test_to_value() {
        let part = MultipartPart::new(Some("a.txt"), "text/plain", 3);
        assert_eq!(
            part.to_value(),
            json!({"type": "file", "filename": "a.txt", "mimetype": "text/plain", "size": 3})
        );
    }
}
