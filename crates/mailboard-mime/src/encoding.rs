//! MIME encoding and decoding utilities.
//!
//! Supports Base64 (both alphabets), Quoted-Printable, and RFC 2047 header
//! encoded-words.

use crate::error::{Error, Result};
use base64::Engine;
use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use encoding_rs::{Encoding, UTF_8};

/// Maximum line length for encoded bodies (RFC 2045).
pub const MAX_LINE_LENGTH: usize = 76;

/// Encodes data as Base64.
#[must_use]
pub fn encode_base64(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Encodes data as Base64, broken into CRLF-separated lines of at most
/// `line_length` characters.
#[must_use]
pub fn encode_base64_wrapped(data: &[u8], line_length: usize) -> String {
    let encoded = encode_base64(data);
    if line_length == 0 || encoded.len() <= line_length {
        return encoded;
    }

    // The Base64 alphabet is ASCII, so byte chunks are char boundaries.
    encoded
        .as_bytes()
        .chunks(line_length)
        .map(String::from_utf8_lossy)
        .collect::<Vec<_>>()
        .join("\r\n")
}

/// Decodes Base64 data.
///
/// # Errors
///
/// Returns an error if the input is not valid Base64.
pub fn decode_base64(data: &str) -> Result<Vec<u8>> {
    STANDARD.decode(data).map_err(Into::into)
}

/// Encodes data with the URL-safe Base64 alphabet and no padding.
///
/// This is the envelope webmail APIs expect for raw messages.
#[must_use]
pub fn encode_base64url(data: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(data)
}

/// Decodes Base64 in either alphabet, with or without padding.
///
/// Whitespace is ignored, so folded payloads decode as well.
///
/// # Errors
///
/// Returns an error if the input is not Base64 in either alphabet.
pub fn decode_base64_lenient(data: &str) -> Result<Vec<u8>> {
    let normalized: String = data
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '=')
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            other => other,
        })
        .collect();

    STANDARD_NO_PAD.decode(normalized).map_err(Into::into)
}

/// Decodes Quoted-Printable text (RFC 2045) into raw bytes.
///
/// Soft line breaks (`=` at end of line) are removed.
///
/// # Errors
///
/// Returns an error if the input contains invalid escape sequences.
pub fn decode_quoted_printable(text: &str) -> Result<Vec<u8>> {
    let bytes = text.as_bytes();
    let mut result = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        let byte = bytes[i];
        if byte != b'=' {
            result.push(byte);
            i += 1;
            continue;
        }

        let rest = &bytes[i + 1..];
        if rest.starts_with(b"\r\n") {
            i += 3;
            continue;
        }
        if rest.starts_with(b"\n") {
            i += 2;
            continue;
        }

        match rest {
            [hi, lo, ..] => {
                let decoded = hex_pair(*hi, *lo).ok_or_else(|| {
                    Error::InvalidEncoding(format!(
                        "Invalid hex: ={}{}",
                        char::from(*hi),
                        char::from(*lo)
                    ))
                })?;
                result.push(decoded);
                i += 3;
            }
            _ => {
                return Err(Error::InvalidEncoding(
                    "Incomplete escape sequence".to_string(),
                ));
            }
        }
    }

    Ok(result)
}

fn hex_pair(hi: u8, lo: u8) -> Option<u8> {
    let hi = char::from(hi).to_digit(16)?;
    let lo = char::from(lo).to_digit(16)?;
    u8::try_from(hi * 16 + lo).ok()
}

/// Encodes a header value using RFC 2047 encoding.
///
/// Pure ASCII input is returned unchanged. Anything else becomes a single
/// `=?UTF-8?B?...?=` word. Lines are not folded.
#[must_use]
pub fn encode_rfc2047(text: &str) -> String {
    if text.is_ascii() {
        return text.to_string();
    }

    format!("=?UTF-8?B?{}?=", encode_base64(text.as_bytes()))
}

/// An encoded-word that could not be decoded and was kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedWord {
    /// The literal `=?...?=` text.
    pub word: String,
    /// Why decoding failed.
    pub reason: String,
}

/// Result of decoding a header value that may contain encoded-words.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedText {
    /// The value with every decodable encoded-word replaced.
    pub text: String,
    /// Encoded-words left in place because they could not be decoded.
    pub malformed: Vec<MalformedWord>,
}

/// Decodes every RFC 2047 encoded-word in a header value.
///
/// Malformed words are left untouched; see [`decode_rfc2047_report`] to
/// find out which ones.
#[must_use]
pub fn decode_rfc2047(text: &str) -> String {
    decode_rfc2047_report(text).text
}

/// Decodes every RFC 2047 encoded-word in a header value, reporting the
/// words that had to be left undecoded.
///
/// Each `=?charset?B|Q?text?=` occurrence is decoded independently. Text
/// between words, including whitespace, is preserved as-is.
#[must_use]
pub fn decode_rfc2047_report(text: &str) -> DecodedText {
    let mut decoded = DecodedText {
        text: String::with_capacity(text.len()),
        malformed: Vec::new(),
    };
    let mut rest = text;

    while let Some(start) = rest.find("=?") {
        decoded.text.push_str(&rest[..start]);
        let candidate = &rest[start..];

        let Some((word, consumed)) = EncodedWord::split(candidate) else {
            decoded.text.push_str("=?");
            rest = &candidate[2..];
            continue;
        };

        let literal = &candidate[..consumed];
        match word.decode() {
            Ok(value) => decoded.text.push_str(&value),
            Err(e) => {
                tracing::debug!(word = literal, error = %e, "Leaving encoded-word undecoded");
                decoded.text.push_str(literal);
                decoded.malformed.push(MalformedWord {
                    word: literal.to_string(),
                    reason: e.to_string(),
                });
            }
        }
        rest = &candidate[consumed..];
    }

    decoded.text.push_str(rest);
    decoded
}

/// One `=?charset?encoding?text?=` token, borrowed from the header value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct EncodedWord<'a> {
    charset: &'a str,
    encoding: &'a str,
    text: &'a str,
}

impl<'a> EncodedWord<'a> {
    /// Splits an encoded-word off the front of `input`, which must start
    /// with `=?`. Returns the word and the number of bytes it spans.
    fn split(input: &'a str) -> Option<(Self, usize)> {
        let body = input.strip_prefix("=?")?;

        let (charset, after_charset) = body.split_once('?')?;
        if charset.is_empty() || charset.contains(char::is_whitespace) {
            return None;
        }

        let (encoding, after_encoding) = after_charset.split_once('?')?;
        if encoding.is_empty() || encoding.contains(char::is_whitespace) {
            return None;
        }

        let text_end = after_encoding.find('?')?;
        if !after_encoding[text_end..].starts_with("?=") {
            return None;
        }
        let text = &after_encoding[..text_end];

        let consumed = 2 + charset.len() + 1 + encoding.len() + 1 + text.len() + 2;
        Some((
            Self {
                charset,
                encoding,
                text,
            },
            consumed,
        ))
    }

    fn decode(&self) -> Result<String> {
        let bytes = match self.encoding {
            "B" | "b" => decode_base64_lenient(self.text)?,
            "Q" | "q" => decode_quoted_printable(&self.text.replace('_', " "))?,
            other => {
                return Err(Error::InvalidEncoding(format!(
                    "Unknown encoding: {other}"
                )));
            }
        };

        decode_charset(self.charset, bytes)
    }
}

/// Decodes bytes in the named charset.
///
/// UTF-8 and unrecognized labels are decoded as strict UTF-8. RFC 2231
/// language suffixes (`UTF-8*en`) are ignored.
fn decode_charset(charset: &str, bytes: Vec<u8>) -> Result<String> {
    let label = charset.split('*').next().unwrap_or(charset).trim();

    match Encoding::for_label(label.as_bytes()) {
        Some(encoding) if encoding != UTF_8 => encoding
            .decode_without_bom_handling_and_without_replacement(&bytes)
            .map(std::borrow::Cow::into_owned)
            .ok_or_else(|| Error::UnknownCharset(label.to_string())),
        _ => String::from_utf8(bytes).map_err(Into::into),
    }
}
