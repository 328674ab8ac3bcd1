use super::{RequestPattern, UriMatcher};
use crate::headers::canonical_header_name;
use std::fmt;

impl fmt::Display for RequestPattern {
    /// `METHOD uri`, one `Header: value` line per header, then the body after a blank line.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rendered = String::new();

        if let Some(method) = &self.method {
            rendered.push_str(method);
            rendered.push(' ');
        }

        match &self.uri {
            Some(UriMatcher::Literal(_)) => {
                rendered.push_str(&self.resolved_uri().unwrap_or_default());
                rendered.push(' ');
            }
            Some(UriMatcher::Predicate(_)) => rendered.push_str("<callable> "),
            None => {}
        }

        if let Some(headers) = &self.headers {
            for (name, value) in headers {
                rendered.push_str(&format!("\n{}: {}", canonical_header_name(name), value));
            }
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
