//! Body extraction from a part tree.

use mailboard_mime::encoding::decode_base64_lenient;

use crate::part::MessagePart;
use crate::warning::DecodeWarning;

const TEXT_HTML: &str = "text/html";
const TEXT_PLAIN: &str = "text/plain";

/// The HTML and plain-text bodies found in a message.
///
/// Either may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedBody {
    /// Decoded `text/html` content.
    pub html: String,
    /// Decoded `text/plain` content.
    pub text: String,
}

impl ExtractedBody {
    /// Extracts both bodies from a part tree.
    ///
    /// Every leaf is visited depth-first, left to right. A `text/html` or
    /// `text/plain` leaf with a payload replaces the value found so far, so
    /// the last non-empty match in traversal order wins.
    #[must_use]
    pub fn from_part(part: &MessagePart) -> Self {
        Self::from_part_with_warnings(part).0
    }

    /// Like [`ExtractedBody::from_part`], also reporting payloads that could
    /// not be decoded.
    #[must_use]
    pub fn from_part_with_warnings(part: &MessagePart) -> (Self, Vec<DecodeWarning>) {
        let mut body = Self::default();
        let mut warnings = Vec::new();

        for leaf in part.leaves() {
            let Some(data) = leaf.data.as_deref() else {
                continue;
            };
            let slot = match leaf.mime_type.as_deref() {
                Some(TEXT_HTML) => &mut body.html,
                Some(TEXT_PLAIN) => &mut body.text,
                _ => continue,
            };

            match decode_payload(data) {
                Ok(decoded) if !decoded.is_empty() => *slot = decoded,
                Ok(_) => {}
                Err(e) => warnings.push(DecodeWarning::UndecodableBody {
                    mime_type: leaf.mime_type.clone().unwrap_or_default(),
                    reason: e.to_string(),
                }),
            }
        }

        (body, warnings)
    }

    /// The body to display: HTML if present, else plain text, else empty.
    #[must_use]
    pub fn preferred(&self) -> &str {
        if self.html.is_empty() {
            &self.text
        } else {
            &self.html
        }
    }

    /// The body to summarize: plain text if present, else HTML.
    #[must_use]
    pub fn preview_source(&self) -> &str {
        if self.text.is_empty() {
            &self.html
        } else {
            &self.text
        }
    }
}

/// Decodes a Base64 body payload. Invalid UTF-8 is replaced rather than
/// rejected so one bad byte does not lose the whole body.
fn decode_payload(data: &str) -> mailboard_mime::Result<String> {
    let bytes = decode_base64_lenient(data)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::part::LeafPart;
    use mailboard_mime::encoding::encode_base64url;

    fn inline(mime: &str, text: &str) -> MessagePart {
        LeafPart::inline(mime, encode_base64url(text.as_bytes())).into()
    }

    #[test]
    fn test_single_leaf_root() {
        let body = ExtractedBody::from_part(&inline("text/plain", "just text"));
        assert_eq!(body.text, "just text");
        assert_eq!(body.html, "");
        assert_eq!(body.preferred(), "just text");
    }

    #[test]
    fn test_alternative_returns_both() {
        let tree = MessagePart::container(
            "multipart/alternative",
            vec![inline("text/plain", "plain"), inline("text/html", "<b>rich</b>")],
        );
        let body = ExtractedBody::from_part(&tree);
        assert_eq!(body.text, "plain");
        assert_eq!(body.html, "<b>rich</b>");
        assert_eq!(body.preferred(), "<b>rich</b>");
        assert_eq!(body.preview_source(), "plain");
    }

    #[test]
    fn test_deeper_match_overwrites_outer() {
        let tree = MessagePart::container(
            "multipart/mixed",
            vec![
                inline("text/html", "<p>outer</p>"),
                MessagePart::container(
                    "multipart/related",
                    vec![MessagePart::container(
                        "multipart/alternative",
                        vec![inline("text/html", "<p>inner</p>")],
                    )],
                ),
            ],
        );
        assert_eq!(ExtractedBody::from_part(&tree).html, "<p>inner</p>");
    }

    #[test]
    fn test_empty_payload_does_not_overwrite() {
        let tree = MessagePart::container(
            "multipart/mixed",
            vec![inline("text/plain", "kept"), inline("text/plain", "")],
        );
        assert_eq!(ExtractedBody::from_part(&tree).text, "kept");
    }

    #[test]
    fn test_ignores_other_types_and_missing_payloads() {
        let tree = MessagePart::container(
            "multipart/mixed",
            vec![
                inline("text/calendar", "BEGIN:VCALENDAR"),
                LeafPart {
                    mime_type: Some("text/html".into()),
                    ..LeafPart::default()
                }
                .into(),
                inline("TEXT/PLAIN", "wrong case"),
            ],
        );
        let body = ExtractedBody::from_part(&tree);
        assert_eq!(body, ExtractedBody::default());
        assert_eq!(body.preferred(), "");
    }

    #[test]
    fn test_undecodable_payload_is_reported() {
        let tree = MessagePart::container(
            "multipart/alternative",
            vec![
                LeafPart::inline("text/html", "%%% not base64 %%%").into(),
                inline("text/plain", "fine"),
            ],
        );
        let (body, warnings) = ExtractedBody::from_part_with_warnings(&tree);
        assert_eq!(body.text, "fine");
        assert_eq!(body.html, "");
        assert_eq!(warnings.len(), 1);
        assert!(matches!(
            &warnings[0],
            DecodeWarning::UndecodableBody { mime_type, .. } if mime_type == "text/html"
        ));
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let tree: MessagePart =
            LeafPart::inline("text/plain", encode_base64url(b"ok \xff end")).into();
        assert_eq!(ExtractedBody::from_part(&tree).text, "ok \u{fffd} end");
    }
}
