//! Attachment discovery.

use serde::{Deserialize, Serialize};

use crate::part::MessagePart;

const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// An attachment found in a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    /// Provider attachment reference.
    pub id: String,
    /// Filename.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// Human-readable size, e.g. `1.5 KB`.
    pub size_display: String,
    /// MIME type.
    pub mime_type: String,
}

impl Attachment {
    /// Builds a descriptor for a node that has both a filename and an
    /// attachment reference. Containers qualify too (attached messages).
    #[must_use]
    pub fn from_part(part: &MessagePart) -> Option<Self> {
        let name = part.filename().filter(|n| !n.is_empty())?;
        let id = part.attachment_id()?;
        let size = part.size().unwrap_or(0);

        Some(Self {
            id: id.to_string(),
            name: name.to_string(),
            size,
            size_display: format_size(size),
            mime_type: part.mime_type().unwrap_or(DEFAULT_MIME_TYPE).to_string(),
        })
    }
}

/// Collects every attachment in the tree, in depth-first order.
///
/// Independent of body extraction: a leaf can be both a body candidate and
/// an attachment, and an attached message is collected as well as any
/// attachments nested inside it.
#[must_use]
pub fn extract_attachments(part: &MessagePart) -> Vec<Attachment> {
    part.walk().filter_map(Attachment::from_part).collect()
}

/// Formats a byte count with 1024-based units.
///
/// ```
/// use mailboard_core::format_size;
///
/// assert_eq!(format_size(512), "512 B");
/// assert_eq!(format_size(1536), "1.5 KB");
/// ```
#[must_use]
#[allow(clippy::cast_precision_loss)] // one decimal place is all we show
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

    if bytes < 1024 {
        return format!("{bytes} B");
    }

    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::part::{ContainerPart, LeafPart};

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(1023), "1023 B");
        assert_eq!(format_size(1024), "1.0 KB");
        assert_eq!(format_size(2 * 1024 * 1024), "2.0 MB");
        assert_eq!(format_size(1024 * 1024 * 1024), "1.0 GB");
        assert_eq!(format_size(5 * 1024_u64.pow(4)), "5.0 TB");
        assert_eq!(format_size(3 * 1024_u64.pow(5)), "3072.0 TB");
    }

    #[test]
    fn test_deep_single_attachment() {
        let tree = MessagePart::container(
            "multipart/mixed",
            vec![MessagePart::container(
                "multipart/mixed",
                vec![MessagePart::container(
                    "multipart/mixed",
                    vec![LeafPart::attachment("deep.zip", "att-9", "application/zip", 2048).into()],
                )],
            )],
        );

        let attachments = extract_attachments(&tree);
        assert_eq!(attachments.len(), 1);
        assert_eq!(attachments[0].id, "att-9");
        assert_eq!(attachments[0].name, "deep.zip");
        assert_eq!(attachments[0].size, 2048);
        assert_eq!(attachments[0].size_display, "2.0 KB");
        assert_eq!(attachments[0].mime_type, "application/zip");
    }

    #[test]
    fn test_requires_filename_and_id() {
        let tree = MessagePart::container(
            "multipart/mixed",
            vec![
                LeafPart {
                    filename: Some("no-id.txt".into()),
                    ..LeafPart::default()
                }
                .into(),
                LeafPart {
                    attachment_id: Some("no-name".into()),
                    ..LeafPart::default()
                }
                .into(),
                LeafPart {
                    filename: Some(String::new()),
                    attachment_id: Some("empty-name".into()),
                    ..LeafPart::default()
                }
                .into(),
            ],
        );
        assert!(extract_attachments(&tree).is_empty());
    }

    #[test]
    fn test_defaults_and_order() {
        let tree = MessagePart::container(
            "multipart/mixed",
            vec![
                LeafPart {
                    filename: Some("first.bin".into()),
                    attachment_id: Some("a1".into()),
                    ..LeafPart::default()
                }
                .into(),
                MessagePart::container(
                    "multipart/related",
                    vec![LeafPart::attachment("second.png", "a2", "image/png", 10).into()],
                ),
                LeafPart::attachment("third.txt", "a3", "text/plain", 3).into(),
            ],
        );

        let attachments = extract_attachments(&tree);
        let names: Vec<&str> = attachments.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["first.bin", "second.png", "third.txt"]);
        assert_eq!(attachments[0].size, 0);
        assert_eq!(attachments[0].size_display, "0 B");
        assert_eq!(attachments[0].mime_type, "application/octet-stream");
    }

    #[test]
    fn test_attached_message_container() {
        let forwarded = ContainerPart {
            mime_type: Some("message/rfc822".into()),
            children: vec![
                LeafPart::inline("text/plain", "aGk").into(),
                LeafPart::attachment("inner.png", "att-inner", "image/png", 5).into(),
            ],
            filename: Some("fwd.eml".into()),
            attachment_id: Some("ATT1".into()),
            size: Some(4096),
            data: None,
        };
        let tree = MessagePart::container(
            "multipart/mixed",
            vec![LeafPart::inline("text/plain", "aGk").into(), forwarded.into()],
        );

        let attachments = extract_attachments(&tree);
        let names: Vec<&str> = attachments.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["fwd.eml", "inner.png"]);
        assert_eq!(attachments[0].id, "ATT1");
        assert_eq!(attachments[0].mime_type, "message/rfc822");
        assert_eq!(attachments[0].size_display, "4.0 KB");
    }

    #[test]
    fn test_plain_container_is_not_an_attachment() {
        let tree = MessagePart::container(
            "multipart/mixed",
            vec![LeafPart::inline("text/plain", "aGk").into()],
        );
        assert!(extract_attachments(&tree).is_empty());
    }

    #[test]
    fn test_root_leaf_attachment() {
        let root: MessagePart = LeafPart::attachment("only.pdf", "r1", "application/pdf", 1).into();
        assert_eq!(extract_attachments(&root).len(), 1);
    }
}
