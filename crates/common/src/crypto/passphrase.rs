use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

use super::cipher::{self, CipherError, KdfParams};

/// A user secret that keys the content cipher
///
/// The string is wiped from memory on drop and never printed by `Debug`.
///
/// # Examples
///
/// ```ignore
/// let passphrase = Passphrase::new("secret123")?;
/// let envelope = passphrase.encrypt("hello")?;
/// assert_eq!(passphrase.decrypt(&envelope)?, "hello");
/// ```
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Passphrase(String);

impl fmt::Debug for Passphrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Passphrase(<redacted>)")
    }
}

impl Passphrase {
    /// Wrap a passphrase, rejecting empty (or all-whitespace) input
    pub fn new(value: impl Into<String>) -> Result<Self, CipherError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(CipherError::EmptyPassphrase);
        }
        Ok(Self(value))
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Encrypt text with the default key derivation costs
    pub fn encrypt(&self, plaintext: &str) -> Result<String, CipherError> {
        self.encrypt_with(plaintext, &KdfParams::default())
    }

    /// Encrypt text with explicit key derivation costs
    ///
    /// A fresh salt and nonce are drawn for every call, so encrypting the
    ///  same input twice never yields the same envelope.
    pub fn encrypt_with(&self, plaintext: &str, params: &KdfParams) -> Result<String, CipherError> {
        cipher::seal(self.as_bytes(), plaintext, params)
    }

    /// Decrypt an envelope back to text
    ///
    /// # Errors
    ///
    /// - `Malformed` / `UnsupportedVersion` if the envelope cannot be parsed
    /// - `Authentication` for a wrong passphrase or corrupted data
    /// - `NotText` if the authenticated plaintext is not UTF-8
    pub fn decrypt(&self, envelope: &str) -> Result<String, CipherError> {
        cipher::open(self.as_bytes(), envelope)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_empty_passphrase() {
        assert_eq!(Passphrase::new(""), Err(CipherError::EmptyPassphrase));
        assert_eq!(Passphrase::new("   "), Err(CipherError::EmptyPassphrase));
        assert!(Passphrase::new("k").is_ok());
    }

    #[test]
    fn test_debug_is_redacted() {
        let passphrase = Passphrase::new("hunter2").unwrap();
        let debug = format!("{:?}", passphrase);
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_encrypt_decrypt() {
        let params = KdfParams::new(256, 1, 1).unwrap();
        let passphrase = Passphrase::new("secret123").unwrap();
        let envelope = passphrase.encrypt_with("hello", &params).unwrap();
        assert_eq!(passphrase.decrypt(&envelope).unwrap(), "hello");

        let other = Passphrase::new("wrong").unwrap();
        assert_eq!(other.decrypt(&envelope), Err(CipherError::Authentication));
    }
}
