use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use argon2::{Algorithm, Argon2, Params, Version};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::codec;

/// Current envelope layout version
pub const ENVELOPE_VERSION: u8 = 1;
/// Size of the random Argon2 salt in bytes
pub const SALT_SIZE: usize = 16;
/// Size of the AES-GCM nonce in bytes
pub const NONCE_SIZE: usize = 12;
/// Size of the AES-256 key in bytes
pub const KEY_SIZE: usize = 32;
/// Size of the AES-GCM authentication tag in bytes
pub const TAG_SIZE: usize = 16;

const HEADER_SIZE: usize = 1 + 4 * 3 + SALT_SIZE + NONCE_SIZE;

// Upper bounds on costs read back out of an envelope (m_cost is KiB)
const MAX_M_COST: u32 = 256 * 1024;
const MAX_T_COST: u32 = 16;
const MAX_P_COST: u32 = 16;

/// Errors that can occur during encryption/decryption
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum CipherError {
    #[error("passphrase must not be empty")]
    EmptyPassphrase,
    #[error("malformed ciphertext: {0}")]
    Malformed(String),
    #[error("unsupported ciphertext version {0}")]
    UnsupportedVersion(u8),
    #[error("invalid key derivation parameters: {0}")]
    InvalidParams(String),
    #[error("wrong passphrase or corrupted data")]
    Authentication,
    #[error("decrypted content is not valid text")]
    NotText,
    #[error("encryption failed: {0}")]
    Encrypt(String),
    #[error("failed to generate random bytes: {0}")]
    Random(String),
}

impl CipherError {
    /// True when the input could not even be parsed as an envelope
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            CipherError::Malformed(_) | CipherError::UnsupportedVersion(_)
        )
    }
}

/// Argon2id cost parameters
///
/// `m_cost` is in KiB. The defaults follow the OWASP recommendation for
///  Argon2id (19 MiB, two passes, one lane).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfParams {
    pub m_cost: u32,
    pub t_cost: u32,
    pub p_cost: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            m_cost: 19 * 1024,
            t_cost: 2,
            p_cost: 1,
        }
    }
}

impl KdfParams {
    pub fn new(m_cost: u32, t_cost: u32, p_cost: u32) -> Result<Self, CipherError> {
        let params = Self {
            m_cost,
            t_cost,
            p_cost,
        };
        params.validate()?;
        Ok(params)
    }

    fn validate(&self) -> Result<(), CipherError> {
        if self.m_cost > MAX_M_COST || self.t_cost > MAX_T_COST || self.p_cost > MAX_P_COST {
            return Err(CipherError::InvalidParams(format!(
                "m_cost={}, t_cost={}, p_cost={} exceeds limits",
                self.m_cost, self.t_cost, self.p_cost
            )));
        }
        self.argon2().map(|_| ())
    }

    fn argon2(&self) -> Result<Argon2<'static>, CipherError> {
        let params = Params::new(self.m_cost, self.t_cost, self.p_cost, Some(KEY_SIZE))
            .map_err(|e| CipherError::InvalidParams(e.to_string()))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }

    pub(crate) fn derive_key(
        &self,
        passphrase: &[u8],
        salt: &[u8],
    ) -> Result<Zeroizing<[u8; KEY_SIZE]>, CipherError> {
        let mut key = Zeroizing::new([0u8; KEY_SIZE]);
        self.argon2()?
            .hash_password_into(passphrase, salt, &mut key[..])
            .map_err(|e| CipherError::InvalidParams(e.to_string()))?;
        Ok(key)
    }
}

/// Parsed form of the opaque ciphertext string
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Envelope {
    pub params: KdfParams,
    pub salt: [u8; SALT_SIZE],
    pub nonce: [u8; NONCE_SIZE],
    pub ciphertext: Vec<u8>,
}

impl Envelope {
    fn header(&self) -> [u8; HEADER_SIZE] {
        let mut header = [0u8; HEADER_SIZE];
        header[0] = ENVELOPE_VERSION;
        header[1..5].copy_from_slice(&self.params.m_cost.to_be_bytes());
        header[5..9].copy_from_slice(&self.params.t_cost.to_be_bytes());
        header[9..13].copy_from_slice(&self.params.p_cost.to_be_bytes());
        header[13..13 + SALT_SIZE].copy_from_slice(&self.salt);
        header[13 + SALT_SIZE..].copy_from_slice(&self.nonce);
        header
    }

    pub fn encode(&self) -> String {
        let mut out = Vec::with_capacity(HEADER_SIZE + self.ciphertext.len());
        out.extend_from_slice(&self.header());
        out.extend_from_slice(&self.ciphertext);
        codec::to_base64(out)
    }

    pub fn decode(data: &str) -> Result<Self, CipherError> {
        let raw = codec::from_base64(data).map_err(|e| CipherError::Malformed(e.to_string()))?;
        if raw.len() < HEADER_SIZE + TAG_SIZE {
            return Err(CipherError::Malformed(format!(
                "expected at least {} bytes, got {}",
                HEADER_SIZE + TAG_SIZE,
                raw.len()
            )));
        }
        if raw[0] != ENVELOPE_VERSION {
            return Err(CipherError::UnsupportedVersion(raw[0]));
        }

        let read_u32 = |at: usize| {
            let mut buf = [0u8; 4];
            buf.copy_from_slice(&raw[at..at + 4]);
            u32::from_be_bytes(buf)
        };
        let params = KdfParams {
            m_cost: read_u32(1),
            t_cost: read_u32(5),
            p_cost: read_u32(9),
        };

        let mut salt = [0u8; SALT_SIZE];
        salt.copy_from_slice(&raw[13..13 + SALT_SIZE]);
        let mut nonce = [0u8; NONCE_SIZE];
        nonce.copy_from_slice(&raw[13 + SALT_SIZE..HEADER_SIZE]);

        Ok(Self {
            params,
            salt,
            nonce,
            ciphertext: raw[HEADER_SIZE..].to_vec(),
        })
    }
}

fn random_bytes<const N: usize>() -> Result<[u8; N], CipherError> {
    let mut buf = [0u8; N];
    getrandom::getrandom(&mut buf).map_err(|e| CipherError::Random(e.to_string()))?;
    Ok(buf)
}

/// Encrypt `plaintext` under `passphrase`, returning the opaque envelope
pub(crate) fn seal(
    passphrase: &[u8],
    plaintext: &str,
    params: &KdfParams,
) -> Result<String, CipherError> {
    if passphrase.is_empty() {
        return Err(CipherError::EmptyPassphrase);
    }
    params.validate()?;

    let mut envelope = Envelope {
        params: *params,
        salt: random_bytes()?,
        nonce: random_bytes()?,
        ciphertext: Vec::new(),
    };

    let key = params.derive_key(passphrase, &envelope.salt)?;
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key[..]));
    let header = envelope.header();
    envelope.ciphertext = cipher
        .encrypt(
            Nonce::from_slice(&envelope.nonce),
            Payload {
                msg: plaintext.as_bytes(),
                aad: &header,
            },
        )
        .map_err(|_| CipherError::Encrypt("aead encrypt error".to_string()))?;

    Ok(envelope.encode())
}

/// Decrypt an envelope produced by `seal`
///
/// Fails when the envelope does not parse, when authentication fails, or
///  when the recovered bytes are not UTF-8.
pub(crate) fn open(passphrase: &[u8], data: &str) -> Result<String, CipherError> {
    if passphrase.is_empty() {
        return Err(CipherError::EmptyPassphrase);
    }
    let envelope = Envelope::decode(data)?;
    envelope.params.validate()?;

    let key = envelope.params.derive_key(passphrase, &envelope.salt)?;
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key[..]));
    let header = envelope.header();
    let plaintext = cipher
        .decrypt(
            Nonce::from_slice(&envelope.nonce),
            Payload {
                msg: &envelope.ciphertext,
                aad: &header,
            },
        )
        .map_err(|_| CipherError::Authentication)?;

    String::from_utf8(plaintext).map_err(|_| CipherError::NotText)
}
