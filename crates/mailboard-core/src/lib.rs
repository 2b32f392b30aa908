//! # mailboard-core
//!
//! Normalization of webmail provider messages for `Mailboard`.
//!
//! This crate provides:
//! - The provider message model (a typed MIME part tree)
//! - Body selection (HTML preferred over plain text)
//! - Attachment discovery at any depth
//! - Plain-text previews
//! - Folder and flag derivation from labels
//! - **Email decoding** - one flat [`Email`] record per provider message
//!
//! ```
//! use mailboard_core::{EmailDecoder, Folder, ProviderMessage};
//!
//! let message = ProviderMessage::from_json(r#"{
//!     "id": "18c1",
//!     "threadId": "18c1",
//!     "internalDate": "1700000000000",
//!     "labelIds": ["UNREAD", "INBOX"],
//!     "snippet": "Hi there",
//!     "payload": {
//!         "mimeType": "text/plain",
//!         "headers": [{ "name": "Subject", "value": "=?UTF-8?Q?Caf=C3=A9?=" }],
//!         "body": { "data": "SGkgdGhlcmU" }
//!     }
//! }"#)?;
//!
//! let email = EmailDecoder::new().decode(&message);
//! assert_eq!(email.subject, "Café");
//! assert_eq!(email.body, "Hi there");
//! assert_eq!(email.folder, Folder::Inbox);
//! assert!(!email.read);
//! # Ok::<(), mailboard_core::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod attachment;
mod body;
mod config;
mod decoder;
mod email;
mod error;
pub mod part;
mod preview;
mod warning;

pub use attachment::{Attachment, extract_attachments, format_size};
pub use body::ExtractedBody;
pub use config::CodecConfig;
pub use decoder::{Decoded, EmailDecoder, decode_message};
pub use email::{Email, Folder, STARRED_LABEL, UNREAD_LABEL};
pub use error::{Error, Result};
pub use part::{ContainerPart, LeafPart, MessagePart, ProviderMessage, Walk};
pub use preview::{DEFAULT_PREVIEW_LENGTH, generate_preview};
pub use warning::DecodeWarning;

pub use mailboard_mime::{
    Address, Headers, MessageBuilder, OutboundAttachment, OutboundMessage, RawMessage,
};
