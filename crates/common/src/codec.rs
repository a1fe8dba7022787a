//! Text encodings for byte sequences
//!
//! Frames travel to the network as lowercase hex, namespaces travel as
//! standard-alphabet base64 on query strings, and fetched blob data comes
//! back as base64. Every conversion here is lossless, including for the
//! empty sequence.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum CodecError {
    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Encode bytes as lowercase hex
pub fn to_hex(data: impl AsRef<[u8]>) -> String {
    hex::encode(data)
}

/// Decode hex, accepting either letter case
pub fn from_hex(data: &str) -> Result<Vec<u8>, CodecError> {
    Ok(hex::decode(data.trim())?)
}

/// Encode bytes as padded standard base64
pub fn to_base64(data: impl AsRef<[u8]>) -> String {
    STANDARD.encode(data)
}

/// Decode padded standard base64
pub fn from_base64(data: &str) -> Result<Vec<u8>, CodecError> {
    Ok(STANDARD.decode(data.trim())?)
}

/// Re-encode a base64 string as hex without an intermediate owner
pub fn base64_to_hex(data: &str) -> Result<String, CodecError> {
    from_base64(data).map(to_hex)
}
