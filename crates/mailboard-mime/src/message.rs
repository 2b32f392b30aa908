//! Outbound message construction.
//!
//! Turns a compose/reply/forward request into an RFC 2822 message and wraps
//! it in the URL-safe Base64 envelope the webmail transport expects.

use crate::content_type::ContentType;
use crate::encoding::{
    MAX_LINE_LENGTH, decode_base64_lenient, encode_base64_wrapped, encode_base64url,
    encode_rfc2047,
};
use crate::error::Result;
use chrono::{DateTime, Utc};
use rand::Rng;
use rand::distributions::Alphanumeric;
use std::fmt;

/// Line terminator for the raw message.
const CRLF: &str = "\r\n";

/// Transfer encoding types used when framing a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferEncoding {
    /// Declared for the verbatim text body, whatever its content.
    SevenBit,
    /// Base64 encoding, used for attachments.
    Base64,
}

impl fmt::Display for TransferEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SevenBit => write!(f, "7bit"),
            Self::Base64 => write!(f, "base64"),
        }
    }
}

/// A file attached to an outbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundAttachment {
    /// Filename shown to the recipient.
    pub filename: String,
    /// MIME type, e.g. `application/pdf`.
    pub content_type: String,
    /// Raw file bytes.
    pub content: Vec<u8>,
}

impl OutboundAttachment {
    /// Creates a new attachment.
    #[must_use]
    pub fn new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        content: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            content: content.into(),
        }
    }

    /// Parsed content type, falling back to `application/octet-stream`
    /// when the declared one is empty or malformed.
    fn mime_type(&self) -> ContentType {
        ContentType::parse(&self.content_type).unwrap_or_else(|e| {
            tracing::debug!(filename = %self.filename, error = %e, "Using octet-stream for attachment");
            ContentType::octet_stream()
        })
    }
}

/// An email to be sent.
///
/// `to` must not be empty; checking that (and address syntax) is up to the
/// caller. The builder never fails on odd input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutboundMessage {
    /// Recipient addresses.
    pub to: Vec<String>,
    /// CC addresses.
    pub cc: Vec<String>,
    /// BCC addresses.
    pub bcc: Vec<String>,
    /// Subject line.
    pub subject: String,
    /// Body text, possibly HTML markup.
    pub body: String,
    /// Reply-To address.
    pub reply_to: Option<String>,
    /// Message-ID being replied to.
    pub in_reply_to: Option<String>,
    /// Thread references.
    pub references: Option<String>,
    /// Attachments, in order.
    pub attachments: Vec<OutboundAttachment>,
}

impl OutboundMessage {
    /// Creates a new outbound message with no recipients.
    #[must_use]
    pub fn new(subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            body: body.into(),
            ..Self::default()
        }
    }

    /// Adds a recipient.
    #[must_use]
    pub fn to(mut self, recipient: impl Into<String>) -> Self {
        self.to.push(recipient.into());
        self
    }

    /// Adds a CC recipient.
    #[must_use]
    pub fn cc(mut self, recipient: impl Into<String>) -> Self {
        self.cc.push(recipient.into());
        self
    }

    /// Adds a BCC recipient.
    #[must_use]
    pub fn bcc(mut self, recipient: impl Into<String>) -> Self {
        self.bcc.push(recipient.into());
        self
    }

    /// Sets the Reply-To address.
    #[must_use]
    pub fn reply_to(mut self, address: impl Into<String>) -> Self {
        self.reply_to = Some(address.into());
        self
    }

    /// Sets the Message-ID this message replies to.
    #[must_use]
    pub fn in_reply_to(mut self, message_id: impl Into<String>) -> Self {
        self.in_reply_to = Some(message_id.into());
        self
    }

    /// Sets the References header.
    #[must_use]
    pub fn references(mut self, references: impl Into<String>) -> Self {
        self.references = Some(references.into());
        self
    }

    /// Adds an attachment.
    #[must_use]
    pub fn attach(mut self, attachment: OutboundAttachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// Builds the transport-ready raw message using the current time and a
    /// fresh boundary.
    #[must_use]
    pub fn to_raw(&self) -> RawMessage {
        MessageBuilder::new(self).build()
    }
}

/// A framed message in the URL-safe Base64 transport envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMessage(String);

impl RawMessage {
    /// Wraps message bytes in the transport envelope.
    #[must_use]
    pub fn encode(message: &[u8]) -> Self {
        Self(encode_base64url(message))
    }

    /// Returns the envelope string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the message, returning the envelope string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }

    /// Unwraps the envelope back into message bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the envelope is not valid Base64.
    pub fn decode(&self) -> Result<Vec<u8>> {
        decode_base64_lenient(&self.0)
    }
}

impl fmt::Display for RawMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RawMessage {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Frames an [`OutboundMessage`] as RFC 2822 text.
///
/// Date and boundary default to the current time and a random token; both
/// can be pinned for reproducible output.
#[derive(Debug, Clone)]
pub struct MessageBuilder<'a> {
    message: &'a OutboundMessage,
    date: Option<DateTime<Utc>>,
    boundary: Option<String>,
    line_length: Option<usize>,
}

impl<'a> MessageBuilder<'a> {
    /// Creates a builder for the given message.
    #[must_use]
    pub const fn new(message: &'a OutboundMessage) -> Self {
        Self {
            message,
            date: None,
            boundary: None,
            line_length: Some(MAX_LINE_LENGTH),
        }
    }

    /// Uses a fixed `Date:` instead of the current time.
    #[must_use]
    pub fn date(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }

    /// Uses a fixed multipart boundary.
    #[must_use]
    pub fn boundary(mut self, boundary: impl Into<String>) -> Self {
        self.boundary = Some(boundary.into());
        self
    }

    /// Sets the attachment Base64 line length; `None` keeps each
    /// attachment on one line.
    #[must_use]
    pub fn line_length(mut self, line_length: Option<usize>) -> Self {
        self.line_length = line_length;
        self
    }

    /// Builds the message and wraps it for transport.
    #[must_use]
    pub fn build(&self) -> RawMessage {
        RawMessage::encode(self.to_rfc2822().as_bytes())
    }

    /// Builds the CRLF-delimited RFC 2822 text.
    #[must_use]
    pub fn to_rfc2822(&self) -> String {
        let message = self.message;
        tracing::trace!(
            recipients = message.to.len(),
            attachments = message.attachments.len(),
            "Building raw message"
        );

        let mut lines: Vec<String> = Vec::new();

        lines.push(format!("To: {}", message.to.join(", ")));
        if !message.cc.is_empty() {
            lines.push(format!("Cc: {}", message.cc.join(", ")));
        }
        if !message.bcc.is_empty() {
            lines.push(format!("Bcc: {}", message.bcc.join(", ")));
        }
        lines.push(format!("Subject: {}", encode_rfc2047(&message.subject)));

        let date = self.date.unwrap_or_else(Utc::now);
        lines.push(format!("Date: {}", date.format("%a, %d %b %Y %H:%M:%S GMT")));

        if let Some(reply_to) = &message.reply_to {
            lines.push(format!("Reply-To: {reply_to}"));
        }
        if let Some(in_reply_to) = &message.in_reply_to {
            lines.push(format!("In-Reply-To: {in_reply_to}"));
        }
        if let Some(references) = &message.references {
            lines.push(format!("References: {references}"));
        }
        lines.push("MIME-Version: 1.0".to_string());

        let body_type = ContentType::for_body(&message.body);
        let body_encoding = TransferEncoding::SevenBit;

        if message.attachments.is_empty() {
            lines.push(format!("Content-Type: {body_type}"));
            lines.push(format!("Content-Transfer-Encoding: {body_encoding}"));
            lines.push(String::new());
            lines.push(message.body.clone());
            return lines.join(CRLF);
        }

        let boundary = self.boundary.clone().unwrap_or_else(generate_boundary);
        lines.push(format!(
            "Content-Type: {}",
            ContentType::multipart_mixed(boundary.as_str())
        ));
        lines.push(String::new());

        lines.push(format!("--{boundary}"));
        lines.push(format!("Content-Type: {body_type}"));
        lines.push(format!("Content-Transfer-Encoding: {body_encoding}"));
        lines.push(String::new());
        lines.push(message.body.clone());

        for attachment in &message.attachments {
            let filename = encode_rfc2047(&attachment.filename);
            let content_type = attachment
                .mime_type()
                .with_quoted_parameter("name", filename.as_str());

            lines.push(format!("--{boundary}"));
            lines.push(format!("Content-Type: {content_type}"));
            lines.push(format!("Content-Transfer-Encoding: {}", TransferEncoding::Base64));
            lines.push(format!(
                "Content-Disposition: attachment; filename=\"{}\"",
                escape_quoted(&filename)
            ));
            lines.push(String::new());
            lines.push(encode_base64_wrapped(
                &attachment.content,
                self.line_length.unwrap_or(0),
            ));
        }

        lines.push(format!("--{boundary}--"));
        lines.join(CRLF)
    }
}

fn escape_quoted(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Generates a boundary unique to one message: a millisecond timestamp plus
/// a random suffix.
fn generate_boundary() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(16)
        .map(char::from)
        .collect();
    format!("mailboard_{}_{suffix}", Utc::now().timestamp_millis())
}
