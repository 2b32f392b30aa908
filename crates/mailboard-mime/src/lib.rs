//! # mailboard-mime
//!
//! Header, address, and raw-message codec for webmail transports.
//!
//! ## Features
//!
//! - **Header codec**: RFC 2047 encoded-word decoding (`B` and `Q`, any
//!   number per value, malformed words left in place) and encoding
//! - **Addresses**: `"Name" <addr>` and address-list parsing
//! - **Message building**: single-part or `multipart/mixed` RFC 2822
//!   framing with attachments, wrapped in URL-safe Base64
//! - **Encodings**: Base64 (both alphabets), Quoted-Printable
//!
//! ## Quick Start
//!
//! ### Decoding Headers
//!
//! ```
//! use mailboard_mime::{Address, Headers};
//!
//! let from = Headers::decode_value("=?UTF-8?Q?Andr=C3=A9?= <andre@example.com>");
//! let address = Address::parse(&from);
//! assert_eq!(address.name, "André");
//! assert_eq!(address.email, "andre@example.com");
//! ```
//!
//! ### Building Messages
//!
//! ```
//! use mailboard_mime::{OutboundAttachment, OutboundMessage};
//!
//! let raw = OutboundMessage::new("Report", "<p>Attached.</p>")
//!     .to("recipient@example.com")
//!     .attach(OutboundAttachment::new("report.csv", "text/csv", b"a,b\n1,2\n".to_vec()))
//!     .to_raw();
//!
//! // Ready for the transport's `raw` field.
//! assert!(!raw.as_str().contains('+'));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod address;
mod content_type;
mod error;
mod header;
mod message;

pub mod encoding;

pub use address::{Address, parse_address_list};
pub use content_type::{ContentType, Parameter};
pub use encoding::{DecodedText, MalformedWord};
pub use error::{Error, Result};
pub use header::Headers;
pub use message::{
    MessageBuilder, OutboundAttachment, OutboundMessage, RawMessage, TransferEncoding,
};
