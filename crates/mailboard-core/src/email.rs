//! The normalized email record.

use std::fmt;

use chrono::{DateTime, Utc};
use mailboard_mime::Address;
use serde::{Deserialize, Serialize};

use crate::attachment::Attachment;

/// Label marking a message as unread.
pub const UNREAD_LABEL: &str = "UNREAD";

/// Label marking a message as starred.
pub const STARRED_LABEL: &str = "STARRED";

/// The single folder a message is shown in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Folder {
    /// Inbox.
    #[default]
    Inbox,
    /// Sent mail.
    Sent,
    /// Drafts.
    Draft,
    /// Trash.
    Trash,
    /// Spam.
    Spam,
    /// Important.
    Important,
    /// Starred.
    Starred,
}

impl Folder {
    /// Folders in the order their labels are checked.
    ///
    /// A message can carry several of these labels; the first one present
    /// decides its folder. Clients depend on this order.
    pub const PRIORITY: [Self; 7] = [
        Self::Inbox,
        Self::Sent,
        Self::Draft,
        Self::Trash,
        Self::Spam,
        Self::Important,
        Self::Starred,
    ];

    /// The provider label for this folder.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Inbox => "INBOX",
            Self::Sent => "SENT",
            Self::Draft => "DRAFT",
            Self::Trash => "TRASH",
            Self::Spam => "SPAM",
            Self::Important => "IMPORTANT",
            Self::Starred => STARRED_LABEL,
        }
    }

    /// The lowercase name used by clients.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inbox => "inbox",
            Self::Sent => "sent",
            Self::Draft => "draft",
            Self::Trash => "trash",
            Self::Spam => "spam",
            Self::Important => "important",
            Self::Starred => "starred",
        }
    }

    /// Picks the folder for a set of labels, defaulting to the inbox.
    #[must_use]
    pub fn from_labels<S: AsRef<str>>(labels: &[S]) -> Self {
        Self::PRIORITY
            .into_iter()
            .find(|folder| labels.iter().any(|l| l.as_ref() == folder.label()))
            .unwrap_or_default()
    }
}

impl fmt::Display for Folder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A message flattened for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Email {
    /// Message ID.
    pub id: String,
    /// Thread ID.
    pub thread_id: String,
    /// Sender.
    pub from: Address,
    /// Recipient addresses.
    pub to: Vec<String>,
    /// CC addresses.
    pub cc: Vec<String>,
    /// BCC addresses.
    pub bcc: Vec<String>,
    /// Decoded subject.
    pub subject: String,
    /// Short plain-text preview.
    pub preview: String,
    /// HTML body if present, else plain text, else empty.
    pub body: String,
    /// Receive time.
    pub date: DateTime<Utc>,
    /// Whether the message has been read.
    pub read: bool,
    /// Whether the message is starred.
    pub starred: bool,
    /// Folder derived from the labels.
    pub folder: Folder,
    /// Labels as received.
    pub label_ids: Vec<String>,
    /// Attachments; `None` when there are none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<Attachment>>,
    /// Provider snippet as received.
    pub snippet: String,
}

impl Email {
    /// Returns true if the message has at least one attachment.
    #[must_use]
    pub fn has_attachments(&self) -> bool {
        self.attachments.as_ref().is_some_and(|a| !a.is_empty())
    }
}
