//! Problems recovered from while decoding a message.

/// A per-field problem that was worked around with a default.
///
/// Decoding never fails on bad input data; these are reported alongside
/// the result instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeWarning {
    /// An encoded-word was left as literal text.
    #[error("Undecodable encoded-word in {header}: {word}")]
    MalformedEncodedWord {
        /// Header the word appeared in.
        header: String,
        /// The literal word.
        word: String,
    },

    /// A body payload was not Base64 and was skipped.
    #[error("Undecodable {mime_type} body: {reason}")]
    UndecodableBody {
        /// MIME type of the skipped part.
        mime_type: String,
        /// Decoder error.
        reason: String,
    },

    /// `internalDate` was not an epoch-millisecond integer; epoch 0 was used.
    #[error("Invalid internal date: {raw:?}")]
    InvalidInternalDate {
        /// The value as received.
        raw: String,
    },
}
