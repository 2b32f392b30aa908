//! Provider message to [`Email`] normalization.

use chrono::{DateTime, Utc};
use mailboard_mime::{Address, Headers, parse_address_list};

use crate::attachment::extract_attachments;
use crate::body::ExtractedBody;
use crate::config::CodecConfig;
use crate::email::{Email, Folder, STARRED_LABEL, UNREAD_LABEL};
use crate::part::ProviderMessage;
use crate::preview::generate_preview;
use crate::warning::DecodeWarning;

/// An [`Email`] together with the problems recovered from while decoding it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    /// The normalized message.
    pub email: Email,
    /// Recovered problems, in the order they were found.
    pub warnings: Vec<DecodeWarning>,
}

/// Turns provider messages into [`Email`] records.
///
/// Decoding is a pure function of the message and the configuration; it
/// never fails; bad fields fall back to defaults.
#[derive(Debug, Clone, Default)]
pub struct EmailDecoder {
    config: CodecConfig,
}

impl EmailDecoder {
    /// Creates a decoder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a decoder with the given settings.
    #[must_use]
    pub const fn with_config(config: CodecConfig) -> Self {
        Self { config }
    }

    /// Returns the decoder settings.
    #[must_use]
    pub const fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Decodes a provider message.
    #[must_use]
    pub fn decode(&self, message: &ProviderMessage) -> Email {
        self.decode_with_warnings(message).email
    }

    /// Decodes a provider message, also returning recovered problems.
    #[must_use]
    pub fn decode_with_warnings(&self, message: &ProviderMessage) -> Decoded {
        tracing::trace!(id = %message.id, "Decoding message");

        let mut fields = HeaderFields {
            headers: &message.headers,
            warnings: Vec::new(),
        };

        let from = Address::parse(&fields.single("From"));
        let to = fields.address_list("To");
        let cc = fields.address_list("Cc");
        let bcc = fields.address_list("Bcc");
        let subject = fields.single("Subject");
        let mut warnings = fields.warnings;

        let (body, body_warnings) = ExtractedBody::from_part_with_warnings(&message.payload);
        warnings.extend(body_warnings);

        let preview = generate_preview(body.preview_source(), self.config.preview_length);

        let date = parse_internal_date(message.internal_date.as_deref(), &mut warnings);

        let has_label = |label: &str| message.label_ids.iter().any(|l| l == label);
        let attachments = extract_attachments(&message.payload);

        for warning in &warnings {
            tracing::debug!(id = %message.id, %warning, "Recovered while decoding");
        }

        Decoded {
            email: Email {
                id: message.id.clone(),
                thread_id: message.thread_id.clone(),
                from,
                to,
                cc,
                bcc,
                subject,
                preview,
                body: body.preferred().to_string(),
                date,
                read: !has_label(UNREAD_LABEL),
                starred: has_label(STARRED_LABEL),
                folder: Folder::from_labels(&message.label_ids),
                label_ids: message.label_ids.clone(),
                attachments: (!attachments.is_empty()).then_some(attachments),
                snippet: message.snippet.clone(),
            },
            warnings,
        }
    }
}

/// Decodes a provider message with default settings.
#[must_use]
pub fn decode_message(message: &ProviderMessage) -> Email {
    EmailDecoder::new().decode(message)
}

/// Header lookups that decode encoded-words and note the ones that failed.
struct HeaderFields<'a> {
    headers: &'a Headers,
    warnings: Vec<DecodeWarning>,
}

impl HeaderFields<'_> {
    /// A simple header: last occurrence wins, empty when absent.
    fn single(&mut self, name: &str) -> String {
        let raw = self.headers.get(name).unwrap_or_default();
        self.decode(name, raw)
    }

    /// An address-list header: all occurrences joined, then parsed.
    fn address_list(&mut self, name: &str) -> Vec<String> {
        self.headers.get_joined(name).map_or_else(Vec::new, |raw| {
            parse_address_list(&self.decode(name, &raw))
        })
    }

    fn decode(&mut self, name: &str, raw: &str) -> String {
        let decoded = Headers::decode_value_report(raw);
        self.warnings
            .extend(
                decoded
                    .malformed
                    .into_iter()
                    .map(|m| DecodeWarning::MalformedEncodedWord {
                        header: name.to_string(),
                        word: m.word,
                    }),
            );
        decoded.text
    }
}

/// Parses epoch milliseconds, falling back to the epoch.
fn parse_internal_date(raw: Option<&str>, warnings: &mut Vec<DecodeWarning>) -> DateTime<Utc> {
    let Some(raw) = raw else {
        return DateTime::UNIX_EPOCH;
    };

    raw.trim()
        .parse::<i64>()
        .ok()
        .and_then(DateTime::from_timestamp_millis)
        .unwrap_or_else(|| {
            warnings.push(DecodeWarning::InvalidInternalDate {
                raw: raw.to_string(),
            });
            DateTime::UNIX_EPOCH
        })
}
