//! Request body classification and normalization.
//!
//! A body is classified by trying, in order: JSON decode, XML parse, the
//! `key=value(&key=value)*` form shape, and finally plain text.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use sxd_document::dom::{ChildOfElement, ChildOfRoot, Element};
use sxd_document::{parser, QName};

static FORM_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^=]+=[^=]*(&[^=]+=[^=]*)*").expect("form shape regex is valid"));

/// Kind of a request body, derived from its content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentKind {
    None,
    Json,
    Xml,
    FormEncoded,
    Plain,
}

impl ContentKind {
    pub fn detect(content: Option<&str>) -> Self {
        match content {
            None => ContentKind::None,
            Some(content) if is_json(content) => ContentKind::Json,
            Some(content) if is_xml(content) => ContentKind::Xml,
            Some(content) if has_form_shape(content) => ContentKind::FormEncoded,
            Some(_) => ContentKind::Plain,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::None => "none",
            ContentKind::Json => "json",
            ContentKind::Xml => "xml",
            ContentKind::FormEncoded => "form-encoded",
            ContentKind::Plain => "plain",
        }
    }
}

pub fn is_json(content: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(content).is_ok()
}

pub fn is_xml(content: &str) -> bool {
    parser::parse(content).is_ok()
}

pub fn has_form_shape(content: &str) -> bool {
    FORM_SHAPE.is_match(content)
}

/// Serialize an XML document without insignificant whitespace.
///
/// Whitespace-only text nodes, comments and processing instructions are dropped,
/// attributes are sorted and names are qualified by namespace URI, so two documents
/// that differ only in formatting produce the same string.
pub fn canonical_xml(content: &str) -> Option<String> {
    let package = parser::parse(content).ok()?;
    let document = package.as_document();

    let mut canonical = String::new();
    for child in document.root().children() {
        if let ChildOfRoot::Element(element) = child {
            write_element(element, &mut canonical);
        }
    }
    Some(canonical)
}

fn write_element(element: Element<'_>, out: &mut String) {
    let name = qualified_name(element.name());

    let mut attributes: Vec<(String, String)> = element
        .attributes()
        .iter()
        .map(|attribute| (qualified_name(attribute.name()), attribute.value().to_string()))
        .collect();
    attributes.sort();

    out.push('<');
    out.push_str(&name);
    for (attribute, value) in &attributes {
        out.push_str(&format!(" {attribute}=\"{}\"", escape_xml(value)));
    }
    out.push('>');

    for child in element.children() {
        match child {
            ChildOfElement::Element(inner) => write_element(inner, out),
            ChildOfElement::Text(text) => {
                let text = text.text();
                if !text.trim().is_empty() {
                    out.push_str(&escape_xml(text));
                }
            }
            _ => {}
        }
    }

    out.push_str("</");
    out.push_str(&name);
    out.push('>');
}

fn qualified_name(name: QName<'_>) -> String {
    match name.namespace_uri() {
        Some(namespace) => format!("{{{namespace}}}{}", name.local_part()),
        None => name.local_part().to_string(),
    }
}

fn escape_xml(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Evaluate an XPath expression against an XML body.
///
/// `namespaces` registers prefixes usable in the expression. Node sets yield the
/// string value of their first node.
pub fn extract_xpath(content: &str, path: &str, namespaces: &[(&str, &str)]) -> Option<String> {
    use sxd_xpath::{Context, Factory, Value};

    let package = parser::parse(content).ok()?;
    let document = package.as_document();

    let xpath = Factory::new().build(path).ok()??;
    let mut context = Context::new();
    for (prefix, uri) in namespaces {
        context.set_namespace(prefix, uri);
    }

    match xpath.evaluate(&context, document.root()).ok()? {
        Value::String(s) => Some(s),
        Value::Number(n) => {
            if n.fract() == 0.0 {
                Some(format!("{}", n as i64))
            } else {
                Some(n.to_string())
            }
        }
        Value::Boolean(b) => Some(b.to_string()),
        Value::Nodeset(nodes) => nodes.iter().next().map(|node| node.string_value()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_kinds() {
        assert_eq!(ContentKind::detect(None), ContentKind::None);
        assert_eq!(ContentKind::detect(Some(r#"{"a":1}"#)), ContentKind::Json);
        assert_eq!(
            ContentKind::detect(Some("<root><first>abc</first></root>")),
            ContentKind::Xml
        );
        assert_eq!(ContentKind::detect(Some("one=1&two=2")), ContentKind::FormEncoded);
        assert_eq!(ContentKind::detect(Some("no form data")), ContentKind::Plain);
    }

    #[test]
    fn test_json_with_equals_sign_is_json() {
        let content = r#"{"value":"key=value"}"#;
        assert!(is_json(content));
        assert_eq!(ContentKind::detect(Some(content)), ContentKind::Json);
    }

    #[test]
    fn test_malformed_xml() {
        assert!(!is_xml("foo"));
        assert!(!is_xml("<root><open></root>"));
        assert!(is_xml("<foo/>"));
    }

    #[test]
    fn test_canonical_xml_ignores_formatting() {
        let compact = "<order><item id=\"1\" qty=\"2\">Book</item></order>";
        let pretty = "<?xml version=\"1.0\"?>\n<order>\n    <item qty=\"2\" id=\"1\">Book</item>\n</order>\n";

        assert_eq!(canonical_xml(compact), canonical_xml(pretty));
        assert_ne!(
            canonical_xml(compact),
            canonical_xml("<order><item id=\"1\" qty=\"3\">Book</item></order>")
        );
        assert_eq!(canonical_xml("not xml"), None);
    }

    #[test]
    fn test_extract_xpath() {
        let xml = "<root><first>abc</first></root>";
        assert_eq!(extract_xpath(xml, "/root/first", &[]), Some("abc".to_string()));
        assert_eq!(extract_xpath(xml, "/root/missing", &[]), None);
    }

    #[test]
    fn test_extract_xpath_with_namespace() {
        let xml = r#"<root xmlns="http://example.org/xml"><first>abc</first></root>"#;
        assert_eq!(
            extract_xpath(xml, "//x:first", &[("x", "http://example.org/xml")]),
            Some("abc".to_string())
        );
    }
}
