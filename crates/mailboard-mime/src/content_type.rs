//! MIME content type handling.

use crate::error::{Error, Result};
use std::fmt;

/// Characters that force a parameter value to be quoted (RFC 2045 tspecials).
const TSPECIALS: &str = "()<>@,;:\\\"/[]?=";

/// A content type parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// Lowercased parameter name.
    pub name: String,
    /// Parameter value, unquoted.
    pub value: String,
    /// Always quote the value when formatting, even if it is a plain token.
    pub quoted: bool,
}

/// MIME content type with parameters.
///
/// Parameters keep their insertion order so that formatting is stable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentType {
    /// Main type (e.g., "text", "image", "multipart").
    pub main_type: String,
    /// Subtype (e.g., "plain", "html", "jpeg").
    pub sub_type: String,
    /// Parameters (e.g., charset=UTF-8, boundary=xxx).
    pub parameters: Vec<Parameter>,
}

impl ContentType {
    /// Creates a new content type.
    #[must_use]
    pub fn new(main_type: impl Into<String>, sub_type: impl Into<String>) -> Self {
        Self {
            main_type: main_type.into(),
            sub_type: sub_type.into(),
            parameters: Vec::new(),
        }
    }

    /// Creates a `text/plain; charset=UTF-8` content type.
    #[must_use]
    pub fn text_plain() -> Self {
        Self::new("text", "plain").with_parameter("charset", "UTF-8")
    }

    /// Creates a `text/html; charset=UTF-8` content type.
    #[must_use]
    pub fn text_html() -> Self {
        Self::new("text", "html").with_parameter("charset", "UTF-8")
    }

    /// Creates an `application/octet-stream` content type.
    #[must_use]
    pub fn octet_stream() -> Self {
        Self::new("application", "octet-stream")
    }

    /// Creates a multipart/mixed content type with a quoted boundary.
    #[must_use]
    pub fn multipart_mixed(boundary: impl Into<String>) -> Self {
        Self::new("multipart", "mixed").with_quoted_parameter("boundary", boundary)
    }

    /// Picks the content type for a composed body.
    ///
    /// This is a substring heuristic, not an HTML parser: a body containing
    /// `<html`, `<div` or `<p>` is treated as HTML, anything else as plain
    /// text. Bodies come from a rich-text editor, which always emits one of
    /// these.
    #[must_use]
    pub fn for_body(body: &str) -> Self {
        if ["<html", "<div", "<p>"].iter().any(|tag| body.contains(tag)) {
            Self::text_html()
        } else {
            Self::text_plain()
        }
    }

    /// Adds or replaces a parameter. The value is quoted only if needed.
    #[must_use]
    pub fn with_parameter(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert_parameter(name.into(), value.into(), false)
    }

    /// Adds or replaces a parameter whose value is always quoted.
    #[must_use]
    pub fn with_quoted_parameter(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert_parameter(name.into(), value.into(), true)
    }

    fn insert_parameter(mut self, name: String, value: String, quoted: bool) -> Self {
        let name = name.to_ascii_lowercase();
        self.parameters.retain(|p| p.name != name);
        self.parameters.push(Parameter {
            name,
            value,
            quoted,
        });
        self
    }

    /// Returns a parameter value by (case-insensitive) name.
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .map(|p| p.value.as_str())
    }

    /// Returns the boundary parameter if present.
    #[must_use]
    pub fn boundary(&self) -> Option<&str> {
        self.parameter("boundary")
    }

    /// Checks if this is an HTML content type.
    #[must_use]
    pub fn is_html(&self) -> bool {
        self.main_type.eq_ignore_ascii_case("text") && self.sub_type.eq_ignore_ascii_case("html")
    }

    /// Parses a content type string.
    ///
    /// Format: `type/subtype; param1=value1; param2="value 2"`
    ///
    /// # Errors
    ///
    /// Returns an error if the type or subtype is missing.
    pub fn parse(s: &str) -> Result<Self> {
        let mut parts = s.split(';');

        let type_str = parts.next().unwrap_or_default().trim();
        let (main_type, sub_type) = type_str
            .split_once('/')
            .map(|(main, sub)| (main.trim(), sub.trim()))
            .filter(|(main, sub)| is_token(main) && is_token(sub))
            .ok_or_else(|| Error::InvalidContentType(s.to_string()))?;

        let mut content_type = Self::new(main_type.to_lowercase(), sub_type.to_lowercase());

        for param in parts {
            if let Some((key, value)) = param.trim().split_once('=') {
                let raw = value.trim();
                let quoted = raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"');
                let value = if quoted { &raw[1..raw.len() - 1] } else { raw };
                content_type = content_type.insert_parameter(
                    key.trim().to_string(),
                    value.to_string(),
                    quoted,
                );
            }
        }

        Ok(content_type)
    }
}

fn is_token(s: &str) -> bool {
    !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_graphic() && !TSPECIALS.contains(c))
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.main_type, self.sub_type)?;

        for Parameter {
            name,
            value,
            quoted,
        } in &self.parameters
        {
            if *quoted || !is_token(value) {
                let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
                write!(f, "; {name}=\"{escaped}\"")?;
            } else {
                write!(f, "; {name}={value}")?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_text_types_display() {
        assert_eq!(ContentType::text_plain().to_string(), "text/plain; charset=UTF-8");
        assert_eq!(ContentType::text_html().to_string(), "text/html; charset=UTF-8");
    }

    #[test]
    fn test_multipart_mixed_quotes_boundary() {
        let ct = ContentType::multipart_mixed("b_123");
        assert_eq!(ct.main_type, "multipart");
        assert_eq!(ct.boundary(), Some("b_123"));
        assert_eq!(ct.to_string(), "multipart/mixed; boundary=\"b_123\"");
    }

    #[test]
    fn test_for_body_heuristic() {
        assert!(ContentType::for_body("<p>hello</p>").is_html());
        assert!(ContentType::for_body("<div>x</div>").is_html());
        assert!(ContentType::for_body("<html><body>x</body></html>").is_html());
        assert!(!ContentType::for_body("a < b and <br>").is_html());
        assert!(!ContentType::for_body("plain words").is_html());
    }

    #[test]
    fn test_content_type_parse() {
        let ct = ContentType::parse("Text/Plain; Charset=utf-8").unwrap();
        assert_eq!((ct.main_type.as_str(), ct.sub_type.as_str()), ("text", "plain"));
        assert_eq!(ct.parameter("charset"), Some("utf-8"));
    }

    #[test]
    fn test_content_type_parse_quoted() {
        let ct = ContentType::parse("multipart/mixed; boundary=\"----=_Part_123\"").unwrap();
        assert_eq!(ct.boundary(), Some("----=_Part_123"));
        assert_eq!(ct.to_string(), "multipart/mixed; boundary=\"----=_Part_123\"");
    }

    #[test]
    fn test_content_type_parse_invalid() {
        assert!(ContentType::parse("").is_err());
        assert!(ContentType::parse("pdf").is_err());
        assert!(ContentType::parse("application/").is_err());
    }

    #[test]
    fn test_with_parameter_replaces() {
        let ct = ContentType::parse("application/pdf; name=old.pdf")
            .unwrap()
            .with_quoted_parameter("name", "report.pdf");
        assert_eq!(ct.to_string(), "application/pdf; name=\"report.pdf\"");
    }
}
