/**
 * Bulletin board records: small JSON posts
 *  encrypted as a single unit.
 */
pub mod board;
/**
 * Lossless hex and base64 conversions used
 *  on the wire.
 */
pub mod codec;
/**
 * Passphrase based encryption.
 *  - Argon2id key derivation
 *  - AES-256-GCM envelopes
 *  - Per-device random keys
 */
pub mod crypto;
/**
 * Self-describing frames: a type token in front
 *  of the ciphertext so readers know how to
 *  decode a blob.
 */
pub mod frame;
/**
 * Local record of what has been posted,
 *  keyed by owner.
 */
pub mod history;
/**
 * Celestia namespace construction.
 */
pub mod namespace;
/**
 * Ties framing, encryption and transport
 *  together into post and retrieve flows.
 */
pub mod pipeline;
/**
 * Metadata stripping for images, applied
 *  before encryption.
 */
pub mod scrub;
/**
 * Unlocked key material with an explicit
 *  lifetime.
 */
pub mod session;
/**
 * Blob storage clients: the Twinkle HTTP API
 *  and an in-process store.
 */
pub mod transport;
/**
 * Helper for setting build version information
 *  at compile time.
 */
pub mod version;

#[cfg(test)]
mod proptests;

pub mod prelude {
    pub use crate::board::{BoardEntry, BoardRecord};
    pub use crate::crypto::{DeviceKey, KdfParams, Passphrase};
    pub use crate::frame::{Content, ContentType, Frame, FrameError};
    pub use crate::history::{HistoryError, HistoryStore, StoredRecord};
    pub use crate::namespace::Namespace;
    pub use crate::pipeline::{Pipeline, PipelineError, PostReceipt, Retrieved};
    pub use crate::scrub::{strip_metadata, ScrubError};
    pub use crate::session::{KeySource, Session, SessionError};
    pub use crate::transport::{
        BlobTransport, Locator, MemoryTransport, SubmitReceipt, TransportError, TwinkleClient,
    };
    pub use crate::version::build_info;
}
