use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

use super::Passphrase;
use crate::codec;

/// Size of a device key in bytes (256 bits)
pub const DEVICE_KEY_SIZE: usize = 32;

#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum DeviceKeyError {
    #[error("invalid device key size, expected {DEVICE_KEY_SIZE}, got {0}")]
    InvalidSize(usize),
    #[error("invalid device key encoding: {0}")]
    Encoding(#[from] codec::CodecError),
    #[error("failed to generate device key: {0}")]
    Random(String),
}

/// A random secret generated once per device and kept in local storage
///
/// Releasing it is gated by the platform (file permissions, an OS keychain
///  prompt) rather than by anything cryptographic. Once released it is used
///  exactly like a typed passphrase: its hex form is the passphrase.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct DeviceKey([u8; DEVICE_KEY_SIZE]);

impl fmt::Debug for DeviceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DeviceKey(<redacted>)")
    }
}

impl DeviceKey {
    pub fn generate() -> Result<Self, DeviceKeyError> {
        let mut buff = [0u8; DEVICE_KEY_SIZE];
        getrandom::getrandom(&mut buff).map_err(|e| DeviceKeyError::Random(e.to_string()))?;
        Ok(Self(buff))
    }

    pub fn from_slice(data: &[u8]) -> Result<Self, DeviceKeyError> {
        if data.len() != DEVICE_KEY_SIZE {
            return Err(DeviceKeyError::InvalidSize(data.len()));
        }
        let mut buff = [0u8; DEVICE_KEY_SIZE];
        buff.copy_from_slice(data);
        Ok(Self(buff))
    }

    pub fn to_hex(&self) -> String {
        codec::to_hex(self.0)
    }

    pub fn from_hex(data: &str) -> Result<Self, DeviceKeyError> {
        let mut bytes = codec::from_hex(data)?;
        let key = Self::from_slice(&bytes);
        bytes.zeroize();
        key
    }

    /// The passphrase this key encrypts under
    pub fn passphrase(&self) -> Passphrase {
        Passphrase::new(self.to_hex()).expect("hex of a 32 byte key is never empty")
    }
}
