//! Message part tree and the provider message it arrives in.
//!
//! The provider sends every node with the same optional fields. On the way
//! in it is converted into a tree of containers (nodes with children) and
//! leaves (nodes carrying a body payload or an attachment reference).

use mailboard_mime::Headers;
use serde::Deserialize;

use crate::error::Result;

/// One node of a message's content tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessagePart {
    /// A node with an inline body or an attachment reference.
    Leaf(LeafPart),
    /// A multipart node; only its children are inspected.
    Container(ContainerPart),
}

/// A leaf of the part tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeafPart {
    /// Declared MIME type, e.g. `text/html`.
    pub mime_type: Option<String>,
    /// Base64 payload (either alphabet).
    pub data: Option<String>,
    /// Attachment filename; never empty when present.
    pub filename: Option<String>,
    /// Provider reference used to download the attachment.
    pub attachment_id: Option<String>,
    /// Payload size in bytes.
    pub size: Option<u64>,
}

/// A node of the part tree with children.
///
/// Usually a multipart, but an attached message (`message/rfc822`) is sent
/// with its own filename and attachment reference as well as its parsed
/// children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerPart {
    /// Declared MIME type, e.g. `multipart/alternative`.
    pub mime_type: Option<String>,
    /// Child parts, in message order.
    pub children: Vec<MessagePart>,
    /// Attachment filename; never empty when present.
    pub filename: Option<String>,
    /// Provider reference used to download the node as an attachment.
    pub attachment_id: Option<String>,
    /// Payload size in bytes.
    pub size: Option<u64>,
    /// Base64 payload sent alongside the children; never used as a body.
    pub data: Option<String>,
}

impl Default for MessagePart {
    fn default() -> Self {
        Self::Leaf(LeafPart::default())
    }
}

impl From<LeafPart> for MessagePart {
    fn from(leaf: LeafPart) -> Self {
        Self::Leaf(leaf)
    }
}

impl From<ContainerPart> for MessagePart {
    fn from(container: ContainerPart) -> Self {
        Self::Container(container)
    }
}

impl MessagePart {
    /// Creates a container node.
    #[must_use]
    pub fn container(mime_type: impl Into<String>, children: Vec<Self>) -> Self {
        Self::Container(ContainerPart {
            mime_type: Some(mime_type.into()),
            children,
            ..ContainerPart::default()
        })
    }

    /// Returns the declared MIME type.
    #[must_use]
    pub fn mime_type(&self) -> Option<&str> {
        match self {
            Self::Leaf(leaf) => leaf.mime_type.as_deref(),
            Self::Container(container) => container.mime_type.as_deref(),
        }
    }

    /// Returns the attachment filename.
    #[must_use]
    pub fn filename(&self) -> Option<&str> {
        match self {
            Self::Leaf(leaf) => leaf.filename.as_deref(),
            Self::Container(container) => container.filename.as_deref(),
        }
    }

    /// Returns the provider attachment reference.
    #[must_use]
    pub fn attachment_id(&self) -> Option<&str> {
        match self {
            Self::Leaf(leaf) => leaf.attachment_id.as_deref(),
            Self::Container(container) => container.attachment_id.as_deref(),
        }
    }

    /// Returns the declared payload size.
    #[must_use]
    pub const fn size(&self) -> Option<u64> {
        match self {
            Self::Leaf(leaf) => leaf.size,
            Self::Container(container) => container.size,
        }
    }

    /// Walks the tree depth-first, left to right, parents before children.
    ///
    /// Uses an explicit stack, so arbitrarily deep trees do not grow the
    /// call stack.
    #[must_use]
    pub fn walk(&self) -> Walk<'_> {
        Walk { stack: vec![self] }
    }

    /// Iterates the leaves in [`walk`](Self::walk) order.
    pub fn leaves(&self) -> impl Iterator<Item = &LeafPart> {
        self.walk().filter_map(|part| match part {
            Self::Leaf(leaf) => Some(leaf),
            Self::Container(_) => None,
        })
    }
}

/// Pre-order iterator over a part tree. See [`MessagePart::walk`].
#[derive(Debug, Clone)]
pub struct Walk<'a> {
    stack: Vec<&'a MessagePart>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a MessagePart;

    fn next(&mut self) -> Option<Self::Item> {
        let part = self.stack.pop()?;
        if let MessagePart::Container(container) = part {
            self.stack.extend(container.children.iter().rev());
        }
        Some(part)
    }
}

impl LeafPart {
    /// Creates an inline leaf with a Base64 payload.
    #[must_use]
    pub fn inline(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: Some(mime_type.into()),
            data: Some(data.into()),
            ..Self::default()
        }
    }

    /// Creates an attachment leaf.
    #[must_use]
    pub fn attachment(
        filename: impl Into<String>,
        attachment_id: impl Into<String>,
        mime_type: impl Into<String>,
        size: u64,
    ) -> Self {
        Self {
            mime_type: Some(mime_type.into()),
            filename: Some(filename.into()),
            attachment_id: Some(attachment_id.into()),
            size: Some(size),
            ..Self::default()
        }
    }
}

/// A message as returned by the provider's message API.
///
/// Deserializes from the provider's JSON (`id`, `threadId`, `internalDate`,
/// `snippet`, `labelIds`, `payload`). The top-level headers are lifted out
/// of the payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "WireMessage")]
pub struct ProviderMessage {
    /// Message ID.
    pub id: String,
    /// Thread ID.
    pub thread_id: String,
    /// Receive time as epoch milliseconds, still in string form.
    pub internal_date: Option<String>,
    /// Provider-generated plain text snippet.
    pub snippet: String,
    /// Label markers such as `INBOX` or `UNREAD`.
    pub label_ids: Vec<String>,
    /// Top-level message headers.
    pub headers: Headers,
    /// Root of the content tree.
    pub payload: MessagePart,
}

impl ProviderMessage {
    /// Parses a provider message from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or has the wrong shape.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(Into::into)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct WireMessage {
    id: String,
    thread_id: String,
    internal_date: Option<WireTimestamp>,
    snippet: String,
    label_ids: Vec<String>,
    payload: Option<WirePart>,
}

/// `internalDate` is documented as a string but some fixtures use a number.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireTimestamp {
    Text(String),
    Millis(i64),
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct WirePart {
    mime_type: Option<String>,
    filename: Option<String>,
    headers: Vec<WireHeader>,
    body: Option<WireBody>,
    parts: Vec<WirePart>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WireHeader {
    name: String,
    value: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct WireBody {
    data: Option<String>,
    attachment_id: Option<String>,
    size: Option<u64>,
}

impl From<WireMessage> for ProviderMessage {
    fn from(wire: WireMessage) -> Self {
        let (headers, payload) = wire.payload.map_or_else(
            || (Headers::new(), MessagePart::default()),
            |mut part| {
                let headers: Headers = std::mem::take(&mut part.headers)
                    .into_iter()
                    .map(|h| (h.name, h.value))
                    .collect();
                (headers, part.into())
            },
        );

        Self {
            id: wire.id,
            thread_id: wire.thread_id,
            internal_date: wire.internal_date.map(|ts| match ts {
                WireTimestamp::Text(text) => text,
                WireTimestamp::Millis(millis) => millis.to_string(),
            }),
            snippet: wire.snippet,
            label_ids: wire.label_ids,
            headers,
            payload,
        }
    }
}

impl From<WirePart> for MessagePart {
    fn from(wire: WirePart) -> Self {
        let body = wire.body.unwrap_or_default();
        let filename = wire.filename.filter(|name| !name.is_empty());
        let attachment_id = body.attachment_id.filter(|id| !id.is_empty());

        if !wire.parts.is_empty() {
            return Self::Container(ContainerPart {
                mime_type: wire.mime_type,
                children: wire.parts.into_iter().map(Into::into).collect(),
                filename,
                attachment_id,
                size: body.size,
                data: body.data,
            });
        }

        Self::Leaf(LeafPart {
            mime_type: wire.mime_type,
            data: body.data,
            filename,
            attachment_id,
            size: body.size,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn leaf(mime: &str) -> MessagePart {
        LeafPart::inline(mime, "").into()
    }

    #[test]
    fn test_walk_is_preorder_left_to_right() {
        let tree = MessagePart::container(
            "multipart/mixed",
            vec![
                MessagePart::container("multipart/alternative", vec![leaf("a"), leaf("b")]),
                leaf("c"),
            ],
        );

        let order: Vec<&str> = tree.walk().filter_map(MessagePart::mime_type).collect();
        assert_eq!(
            order,
            vec!["multipart/mixed", "multipart/alternative", "a", "b", "c"]
        );

        let leaves: Vec<_> = tree.leaves().filter_map(|l| l.mime_type.as_deref()).collect();
        assert_eq!(leaves, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_walk_handles_deep_trees() {
        let mut tree = leaf("text/plain");
        for _ in 0..10_000 {
            tree = MessagePart::container("multipart/mixed", vec![tree]);
        }
        assert_eq!(tree.leaves().count(), 1);
        // Tear down iteratively so the test itself does not overflow on drop.
        let mut current = tree;
        while let MessagePart::Container(mut c) = current {
            current = c.children.pop().unwrap_or_default();
        }
    }

    #[test]
    fn test_provider_message_from_json() {
        let json = r#"{
            "id": "m1",
            "threadId": "t1",
            "internalDate": "1700000000000",
            "snippet": "hi",
            "labelIds": ["INBOX", "UNREAD"],
            "payload": {
                "mimeType": "multipart/mixed",
                "filename": "",
                "headers": [
                    {"name": "Subject", "value": "Hello"},
                    {"name": "From", "value": "a@x.com"}
                ],
                "body": {"size": 0},
                "parts": [
                    {"mimeType": "text/plain", "filename": "", "body": {"size": 2, "data": "aGk"}},
                    {"mimeType": "application/pdf", "filename": "a.pdf",
                     "body": {"size": 10, "attachmentId": "att-1"}}
                ]
            }
        }"#;

        let message = ProviderMessage::from_json(json).unwrap();
        assert_eq!(message.id, "m1");
        assert_eq!(message.thread_id, "t1");
        assert_eq!(message.internal_date.as_deref(), Some("1700000000000"));
        assert_eq!(message.label_ids, vec!["INBOX", "UNREAD"]);
        assert_eq!(message.headers.get("subject"), Some("Hello"));

        let MessagePart::Container(root) = &message.payload else {
            panic!("expected container");
        };
        assert_eq!(root.children.len(), 2);
        assert_eq!(
            root.children[0],
            MessagePart::Leaf(LeafPart {
                mime_type: Some("text/plain".into()),
                data: Some("aGk".into()),
                filename: None,
                attachment_id: None,
                size: Some(2),
            })
        );
        assert_eq!(
            root.children[1],
            LeafPart::attachment("a.pdf", "att-1", "application/pdf", 10).into()
        );
    }

    #[test]
    fn test_attached_message_keeps_its_reference() {
        let json = r#"{
            "id": "m3",
            "payload": {
                "mimeType": "multipart/mixed",
                "filename": "",
                "body": {"size": 0},
                "parts": [{
                    "mimeType": "message/rfc822",
                    "filename": "fwd.eml",
                    "body": {"attachmentId": "ATT1", "size": 4096},
                    "parts": [{"mimeType": "text/plain", "body": {"data": "aGk"}}]
                }]
            }
        }"#;

        let message = ProviderMessage::from_json(json).unwrap();
        assert_eq!(message.payload.filename(), None);
        assert_eq!(message.payload.attachment_id(), None);

        let MessagePart::Container(root) = &message.payload else {
            panic!("expected container");
        };
        let forwarded = &root.children[0];
        assert!(matches!(forwarded, MessagePart::Container(_)));
        assert_eq!(forwarded.mime_type(), Some("message/rfc822"));
        assert_eq!(forwarded.filename(), Some("fwd.eml"));
        assert_eq!(forwarded.attachment_id(), Some("ATT1"));
        assert_eq!(forwarded.size(), Some(4096));
        assert_eq!(forwarded.leaves().count(), 1);
    }

    #[test]
    fn test_provider_message_defaults() {
        let message = ProviderMessage::from_json(r#"{"id": "m2", "internalDate": 5}"#).unwrap();
        assert_eq!(message.internal_date.as_deref(), Some("5"));
        assert!(message.headers.is_empty());
        assert_eq!(message.payload, MessagePart::default());
        assert!(message.label_ids.is_empty());
    }

    #[test]
    fn test_provider_message_rejects_bad_json() {
        assert!(ProviderMessage::from_json("{not json").is_err());
    }
}
