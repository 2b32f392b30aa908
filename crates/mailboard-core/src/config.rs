//! Codec settings.

use mailboard_mime::encoding::MAX_LINE_LENGTH;
use mailboard_mime::{MessageBuilder, OutboundMessage};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::preview::DEFAULT_PREVIEW_LENGTH;

/// Tunables for decoding and building messages.
///
/// Missing fields take their defaults, so `{}` is a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Maximum preview length in characters.
    pub preview_length: usize,
    /// Line length for Base64 attachment bodies; `None` keeps each
    /// attachment on a single line.
    pub attachment_line_length: Option<usize>,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            preview_length: DEFAULT_PREVIEW_LENGTH,
            attachment_line_length: Some(MAX_LINE_LENGTH),
        }
    }
}

impl CodecConfig {
    /// Parses and validates a configuration from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a value is out of range.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that all values are usable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the attachment line length is zero.
    pub fn validate(&self) -> Result<()> {
        if self.attachment_line_length == Some(0) {
            return Err(Error::Config(
                "attachment_line_length must be positive (use null for no wrapping)".into(),
            ));
        }
        Ok(())
    }

    /// Creates a message builder using these settings.
    #[must_use]
    pub fn message_builder<'a>(&self, message: &'a OutboundMessage) -> MessageBuilder<'a> {
        MessageBuilder::new(message).line_length(self.attachment_line_length)
    }
}
