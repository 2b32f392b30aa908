//! Email header handling.

use crate::encoding::{DecodedText, decode_rfc2047_report, encode_rfc2047};

/// Ordered collection of email headers.
///
/// Names are matched case-insensitively. Insertion order is kept so that
/// repeated headers can be joined in the order they appeared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    /// Creates a new empty header collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a header value, keeping any existing values.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// Gets the value of a header. When it appears more than once the last
    /// occurrence wins.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Gets all values for a header, in insertion order.
    #[must_use]
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// Gets all values for a header joined with `", "`, the way repeated
    /// address headers are combined.
    #[must_use]
    pub fn get_joined(&self, name: &str) -> Option<String> {
        let values = self.get_all(name);
        if values.is_empty() {
            None
        } else {
            Some(values.join(", "))
        }
    }

    /// Returns the number of header lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no headers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns an iterator over all headers in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Parses headers from raw message text.
    ///
    /// Parsing stops at the first empty line. Continuation lines (starting
    /// with a space or tab) are unfolded into the previous header.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut headers = Self::new();
        let mut current: Option<(String, String)> = None;

        for line in text.lines() {
            if line.is_empty() {
                break;
            }

            if line.starts_with(' ') || line.starts_with('\t') {
                if let Some((_, value)) = current.as_mut() {
                    value.push(' ');
                    value.push_str(line.trim());
                }
                continue;
            }

            if let Some((name, value)) = current.take() {
                headers.add(name, value.trim());
            }
            if let Some((name, value)) = line.split_once(':') {
                current = Some((name.trim().to_string(), value.trim().to_string()));
            }
        }

        if let Some((name, value)) = current {
            headers.add(name, value.trim());
        }

        headers
    }

    /// Gets a header value with RFC 2047 encoded-words decoded.
    #[must_use]
    pub fn decoded(&self, name: &str) -> Option<String> {
        self.get(name).map(Self::decode_value)
    }

    /// Encodes a header value using RFC 2047 if it is not pure ASCII.
    #[must_use]
    pub fn encode_value(value: &str) -> String {
        encode_rfc2047(value)
    }

    /// Decodes every RFC 2047 encoded-word in a header value.
    ///
    /// Undecodable words are left as they were.
    #[must_use]
    pub fn decode_value(value: &str) -> String {
        Self::decode_value_report(value).text
    }

    /// Like [`Headers::decode_value`], but also reports undecodable words.
    #[must_use]
    pub fn decode_value_report(value: &str) -> DecodedText {
        decode_rfc2047_report(value)
    }
}

impl<N, V> FromIterator<(N, V)> for Headers
where
    N: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(n, v)| (n.into(), v.into()))
                .collect(),
        }
    }
}
