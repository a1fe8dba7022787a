//! Version-0 Celestia namespaces
//!
//! A namespace is a fixed 29 byte tag: one version byte, 18 reserved zero
//! bytes, then up to 10 bytes of user chosen identifier padded with zeros
//! on the right.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::codec;

/// Total size of a namespace tag in bytes
pub const NAMESPACE_SIZE: usize = 29;
/// Version byte for user namespaces
pub const NAMESPACE_VERSION_ZERO: u8 = 0x00;
/// Number of reserved zero bytes following the version byte
pub const RESERVED_ZERO_BYTES: usize = 18;
/// Maximum number of identifier bytes a version-0 namespace can carry
pub const MAX_ID_SIZE: usize = 10;

const ID_OFFSET: usize = 1 + RESERVED_ZERO_BYTES;

#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum NamespaceError {
    #[error("namespace identifier is {0} bytes, at most {MAX_ID_SIZE} allowed")]
    IdTooLong(usize),
    #[error("namespace must be {NAMESPACE_SIZE} bytes, got {0}")]
    InvalidSize(usize),
    #[error("unsupported namespace version {0:#04x}")]
    UnsupportedVersion(u8),
    #[error("reserved namespace bytes must be zero")]
    ReservedBytesSet,
    #[error(transparent)]
    Codec(#[from] codec::CodecError),
}

/// A padded, wire-ready namespace tag
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Namespace([u8; NAMESPACE_SIZE]);

impl Namespace {
    /// Expand an identifier into a namespace, silently truncating anything
    ///  past `MAX_ID_SIZE` bytes
    pub fn pad(id: &[u8]) -> Self {
        let mut tag = [0u8; NAMESPACE_SIZE];
        tag[0] = NAMESPACE_VERSION_ZERO;
        let len = id.len().min(MAX_ID_SIZE);
        tag[ID_OFFSET..ID_OFFSET + len].copy_from_slice(&id[..len]);
        Self(tag)
    }

    /// Like `pad`, but rejects identifiers that would be truncated
    pub fn try_from_id(id: &[u8]) -> Result<Self, NamespaceError> {
        if id.len() > MAX_ID_SIZE {
            return Err(NamespaceError::IdTooLong(id.len()));
        }
        Ok(Self::pad(id))
    }

    /// Parse a full 29 byte tag, checking the version-0 layout
    pub fn from_slice(data: &[u8]) -> Result<Self, NamespaceError> {
        if data.len() != NAMESPACE_SIZE {
            return Err(NamespaceError::InvalidSize(data.len()));
        }
        if data[0] != NAMESPACE_VERSION_ZERO {
            return Err(NamespaceError::UnsupportedVersion(data[0]));
        }
        if data[1..ID_OFFSET].iter().any(|b| *b != 0) {
            return Err(NamespaceError::ReservedBytesSet);
        }
        let mut tag = [0u8; NAMESPACE_SIZE];
        tag.copy_from_slice(data);
        Ok(Self(tag))
    }

    pub fn bytes(&self) -> &[u8; NAMESPACE_SIZE] {
        &self.0
    }

    /// The identifier portion with trailing zero padding removed
    pub fn id(&self) -> &[u8] {
        let id = &self.0[ID_OFFSET..];
        let end = id.iter().rposition(|b| *b != 0).map_or(0, |i| i + 1);
        &id[..end]
    }

    pub fn to_hex(&self) -> String {
        codec::to_hex(self.0)
    }

    pub fn from_hex(data: &str) -> Result<Self, NamespaceError> {
        Self::from_slice(&codec::from_hex(data)?)
    }

    pub fn to_base64(&self) -> String {
        codec::to_base64(self.0)
    }
}

impl fmt::Debug for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Namespace({})", self)
    }
}

/// Displays the identifier as text when it is printable, hex otherwise
impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match std::str::from_utf8(self.id()) {
            Ok(s) if !s.is_empty() && s.chars().all(|c| !c.is_control()) => write!(f, "{}", s),
            _ => write!(f, "{}", codec::to_hex(self.id())),
        }
    }
}

/// Parses a configured identifier string, strictly
impl FromStr for Namespace {
    type Err = NamespaceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from_id(s.as_bytes())
    }
}

impl Serialize for Namespace {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Namespace {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Namespace::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
