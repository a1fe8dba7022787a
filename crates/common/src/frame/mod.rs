//! Self-describing blob framing
//!
//! A frame is what actually gets stored on the network. It starts with a
//! plain ASCII token that names the content type, so a reader can route the
//! blob to the right decoder before it has the passphrase:
//!
//! ```text
//! TEXT:<envelope>            encrypted UTF-8 text
//! IMG:<mime>:<envelope>      encrypted hex of the image bytes
//! REC:<envelope>             encrypted JSON bulletin record
//! <anything else>            legacy, written before type tokens existed
//! ```
//!
//! Only the leading `HEADER_WINDOW` bytes are inspected for a token. MIME
//! types containing `:` are refused when framing, so the first `:` after
//! `IMG:` always ends the MIME type. MIME types are parsed with the `mime`
//! crate, which lowercases the type and subtype, so `IMAGE/PNG` is framed
//! and read back as `image/png`.

mod content;

use std::fmt;
use std::str::FromStr;

use mime::Mime;
use serde::{Deserialize, Serialize};

use crate::codec::{self, CodecError};
use crate::crypto::CipherError;

pub use content::Content;

pub const TEXT_TAG: &str = "TEXT:";
pub const IMAGE_TAG: &str = "IMG:";
pub const RECORD_TAG: &str = "REC:";

/// Number of leading bytes searched for a type token
pub const HEADER_WINDOW: usize = 100;

#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("image header has no ':' terminator within the first {HEADER_WINDOW} bytes")]
    UnterminatedMime,
    #[error("invalid MIME type {0:?}: {1}")]
    InvalidMime(String, String),
    #[error("MIME type {0:?} must not contain ':'")]
    ColonInMime(String),
    #[error("frame is not valid UTF-8 text")]
    NotText,
    #[error("frame is not valid hex: {0}")]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Cipher(#[from] CipherError),
    #[error("decrypted image is not valid hex: {0}")]
    ImageEncoding(CodecError),
    #[error("decrypted record is not a valid bulletin record: {0}")]
    Record(String),
    #[error("failed to serialize record: {0}")]
    Serialize(String),
}

impl FrameError {
    /// True when the frame parsed but its content could not be recovered
    ///  under the given passphrase
    pub fn is_decryption(&self) -> bool {
        matches!(
            self,
            FrameError::Cipher(_) | FrameError::ImageEncoding(_) | FrameError::Record(_)
        )
    }
}

/// The type token carried by a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Text,
    Image,
    Record,
    Legacy,
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ContentType::Text => "text",
            ContentType::Image => "image",
            ContentType::Record => "record",
            ContentType::Legacy => "legacy",
        };
        f.write_str(name)
    }
}

impl FromStr for ContentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(ContentType::Text),
            "image" => Ok(ContentType::Image),
            "record" => Ok(ContentType::Record),
            "legacy" => Ok(ContentType::Legacy),
            other => Err(format!("unknown content type: {}", other)),
        }
    }
}

/// A decoded frame: type token, optional MIME metadata and the still
///  encrypted envelope
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Text { ciphertext: String },
    Image { mime: Mime, ciphertext: String },
    Record { ciphertext: String },
    Legacy { content: String },
}

/// The frame as stored, header included
impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frame::Text { ciphertext } => write!(f, "{}{}", TEXT_TAG, ciphertext),
            Frame::Image { mime, ciphertext } => {
                write!(f, "{}{}:{}", IMAGE_TAG, mime.as_ref(), ciphertext)
            }
            Frame::Record { ciphertext } => write!(f, "{}{}", RECORD_TAG, ciphertext),
            Frame::Legacy { content } => f.write_str(content),
        }
    }
}

/// Parse a MIME type for use in an image header
pub fn parse_mime(value: &str) -> Result<Mime, FrameError> {
    if value.contains(':') {
        return Err(FrameError::ColonInMime(value.to_string()));
    }
    Mime::from_str(value).map_err(|e| FrameError::InvalidMime(value.to_string(), e.to_string()))
}

fn utf8(data: &[u8]) -> Result<String, FrameError> {
    String::from_utf8(data.to_vec()).map_err(|_| FrameError::NotText)
}

impl Frame {
    /// Build an image frame, validating the MIME type
    pub fn image(mime: &str, ciphertext: String) -> Result<Self, FrameError> {
        Ok(Frame::Image {
            mime: parse_mime(mime)?,
            ciphertext,
        })
    }

    pub fn content_type(&self) -> ContentType {
        match self {
            Frame::Text { .. } => ContentType::Text,
            Frame::Image { .. } => ContentType::Image,
            Frame::Record { .. } => ContentType::Record,
            Frame::Legacy { .. } => ContentType::Legacy,
        }
    }

    pub fn mime(&self) -> Option<&Mime> {
        match self {
            Frame::Image { mime, .. } => Some(mime),
            _ => None,
        }
    }

    /// The opaque part of the frame, without any header
    pub fn ciphertext(&self) -> &str {
        match self {
            Frame::Text { ciphertext }
            | Frame::Image { ciphertext, .. }
            | Frame::Record { ciphertext } => ciphertext,
            Frame::Legacy { content } => content,
        }
    }

    /// Serialize to the bytes stored on the network
    pub fn encode(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }

    /// Parse stored bytes back into a frame
    ///
    /// Anything without a known token in the header window is returned as
    ///  `Frame::Legacy`.
    pub fn decode(data: &[u8]) -> Result<Self, FrameError> {
        let window = &data[..data.len().min(HEADER_WINDOW)];

        if window.starts_with(TEXT_TAG.as_bytes()) {
            return Ok(Frame::Text {
                ciphertext: utf8(&data[TEXT_TAG.len()..])?,
            });
        }

        if window.starts_with(RECORD_TAG.as_bytes()) {
            return Ok(Frame::Record {
                ciphertext: utf8(&data[RECORD_TAG.len()..])?,
            });
        }

        if let Some(rest) = window.strip_prefix(IMAGE_TAG.as_bytes()) {
            let end = rest
                .iter()
                .position(|b| *b == b':')
                .ok_or(FrameError::UnterminatedMime)?;
            let mime = std::str::from_utf8(&rest[..end]).map_err(|_| FrameError::NotText)?;
            let mime = parse_mime(mime)?;
            let offset = IMAGE_TAG.len() + end + 1;
            return Ok(Frame::Image {
                mime,
                ciphertext: utf8(&data[offset..])?,
            });
        }

        Ok(Frame::Legacy {
            content: utf8(data)?,
        })
    }

    /// Hex form used as the `data` field of a submit request
    pub fn to_hex(&self) -> String {
        codec::to_hex(self.encode())
    }

    pub fn from_hex(data: &str) -> Result<Self, FrameError> {
        Self::decode(&codec::from_hex(data)?)
    }
}
