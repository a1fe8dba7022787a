//! Passphrase-based content encryption for sealpost
//!
//! Everything that leaves the device is encrypted under a key derived from a
//! passphrase the user supplies out of band. Nothing here is a key exchange:
//! whoever knows the passphrase can read the content.
//!
//! - **Key derivation**: Argon2id over the passphrase with a fresh random
//!   salt per encryption. The cost parameters travel inside the envelope so
//!   old envelopes stay readable when defaults change.
//! - **Encryption**: AES-256-GCM with a fresh random nonce. The envelope
//!   header is authenticated as associated data, so a wrong passphrase or a
//!   flipped bit is always rejected instead of decrypting to garbage.
//! - **Envelope**: a single base64 string,
//!   `version || m_cost || t_cost || p_cost || salt || nonce || ciphertext+tag`.
//!
//! # Key material
//!
//! A `Passphrase` is either typed by the user for the lifetime of a session
//! or produced from a `DeviceKey`, a random 256-bit secret persisted on the
//! device. Both encrypt and decrypt identically.

mod cipher;
mod device_key;
mod passphrase;

pub use cipher::{CipherError, KdfParams, ENVELOPE_VERSION, NONCE_SIZE, SALT_SIZE};
pub use device_key::{DeviceKey, DeviceKeyError, DEVICE_KEY_SIZE};
pub use passphrase::Passphrase;
