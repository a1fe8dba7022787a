//! Post and retrieve flows
//!
//! ```text
//! post:     content -> seal (encrypt + type token) -> hex -> transport.submit
//! retrieve: transport.fetch -> decode frame -> open (decrypt) -> content
//! ```

use uuid::Uuid;

use crate::board::{newest_first, BoardEntry, BoardRecord};
use crate::crypto::{CipherError, KdfParams};
use crate::frame::{Content, ContentType, Frame, FrameError};
use crate::history::StoredRecord;
use crate::namespace::Namespace;
use crate::session::{Session, SessionError};
use crate::transport::{BlobTransport, Locator, SubmitReceipt, TransportError};

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("invalid input: {0}")]
    Validation(String),
    #[error("transport error: {0}")]
    Transport(TransportError),
    /// Nothing at the locator yet; the blob may not be included
    #[error("no blob found at {0}")]
    NotFound(Locator),
    #[error("decryption failed: {0}")]
    Decryption(FrameError),
    #[error("encryption failed: {0}")]
    Encryption(CipherError),
    #[error("malformed frame: {0}")]
    Frame(FrameError),
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl From<TransportError> for PipelineError {
    fn from(e: TransportError) -> Self {
        match e {
            TransportError::NotFound(locator) => PipelineError::NotFound(locator),
            e => PipelineError::Transport(e),
        }
    }
}

impl From<FrameError> for PipelineError {
    fn from(e: FrameError) -> Self {
        if e.is_decryption() {
            PipelineError::Decryption(e)
        } else {
            PipelineError::Frame(e)
        }
    }
}

impl PipelineError {
    /// Whether trying the same request again later could succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, PipelineError::NotFound(_))
    }
}

/// The outcome of a successful post
#[derive(Debug, Clone)]
pub struct PostReceipt {
    pub receipt: SubmitReceipt,
    pub frame: Frame,
}

impl PostReceipt {
    pub fn locator(&self) -> &Locator {
        &self.receipt.locator
    }

    pub fn content_type(&self) -> ContentType {
        self.frame.content_type()
    }

    /// The history entry for this post
    pub fn to_record(&self, owner_id: Uuid) -> StoredRecord {
        StoredRecord::new(
            owner_id,
            self.content_type(),
            self.frame.to_string(),
            &self.receipt,
        )
    }
}

/// Content read back from the network
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Retrieved {
    /// The type token found on the frame; `Legacy` for untagged blobs
    pub content_type: ContentType,
    pub content: Content,
}

/// Encrypts, frames and ships content through a `BlobTransport`
#[derive(Debug, Clone)]
pub struct Pipeline<T: BlobTransport> {
    transport: T,
    namespace: Namespace,
    network: String,
    params: KdfParams,
}

impl<T: BlobTransport> Pipeline<T> {
    pub fn new(transport: T, namespace: Namespace, network: impl Into<String>) -> Self {
        Self {
            transport,
            namespace,
            network: network.into(),
            params: KdfParams::default(),
        }
    }

    /// Key derivation costs for new envelopes
    pub fn with_kdf_params(mut self, params: KdfParams) -> Self {
        self.params = params;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn network(&self) -> &str {
        &self.network
    }

    /// Encrypt `content` under the session key and submit it
    pub async fn post(
        &self,
        session: &Session,
        content: &Content,
    ) -> Result<PostReceipt, PipelineError> {
        validate(content)?;
        let passphrase = session.passphrase()?;

        let frame = content.seal(passphrase, &self.params).map_err(|e| match e {
            FrameError::Cipher(e) => PipelineError::Encryption(e),
            FrameError::ColonInMime(_) | FrameError::InvalidMime(_, _) => {
                PipelineError::Validation(e.to_string())
            }
            e => PipelineError::Frame(e),
        })?;

        let data = frame.encode();
        let receipt = self
            .transport
            .submit(&self.namespace, &data, &self.network)
            .await?;
        tracing::info!(
            locator = %receipt.locator,
            content_type = %frame.content_type(),
            size = data.len(),
            "posted"
        );

        Ok(PostReceipt { receipt, frame })
    }

    /// Post a bulletin board record
    pub async fn post_board(
        &self,
        session: &Session,
        record: BoardRecord,
    ) -> Result<PostReceipt, PipelineError> {
        self.post(session, &Content::Record(record)).await
    }

    /// Fetch the blob at `locator` and decrypt it
    ///
    /// # Errors
    /// * `NotFound` if the locator does not resolve (yet)
    /// * `Decryption` for a wrong key or corrupted ciphertext
    /// * `Frame` if the stored bytes are not a readable frame
    pub async fn retrieve(
        &self,
        session: &Session,
        locator: &Locator,
    ) -> Result<Retrieved, PipelineError> {
        let passphrase = session.passphrase()?;
        let data = self
            .transport
            .fetch(&self.namespace, locator, &self.network)
            .await?;

        let frame = Frame::decode(&data)?;
        let content = frame.open(passphrase)?;
        tracing::info!(%locator, content_type = %frame.content_type(), "retrieved");

        Ok(Retrieved {
            content_type: frame.content_type(),
            content,
        })
    }

    /// Every board record in the namespace readable with the session key,
    ///  newest first
    ///
    /// Blobs that fail to decode or decrypt, or that hold something other
    ///  than a record, are skipped.
    pub async fn read_board(&self, session: &Session) -> Result<Vec<BoardEntry>, PipelineError> {
        let passphrase = session.passphrase()?;
        let blobs = self.transport.list(&self.namespace, &self.network).await?;
        let total = blobs.len();

        let mut entries: Vec<BoardEntry> = blobs
            .into_iter()
            .filter_map(|blob| {
                let content = Frame::decode(&blob.data).and_then(|frame| frame.open(passphrase));
                match content {
                    Ok(Content::Record(record)) => Some(BoardEntry {
                        height: blob.locator.height,
                        commitment: blob.locator.commitment,
                        record,
                    }),
                    Ok(other) => {
                        tracing::debug!(
                            locator = %blob.locator,
                            content_type = %other.content_type(),
                            "skipping non-record blob"
                        );
                        None
                    }
                    Err(e) => {
                        tracing::debug!(locator = %blob.locator, "skipping unreadable blob: {}", e);
                        None
                    }
                }
            })
            .collect();

        entries.sort_by(newest_first);
        tracing::info!(total, readable = entries.len(), "read board");
        Ok(entries)
    }
}

fn validate(content: &Content) -> Result<(), PipelineError> {
    match content {
        Content::Text(message) if message.trim().is_empty() => {
            Err(PipelineError::Validation("message is empty".to_string()))
        }
        Content::Image { data, .. } if data.is_empty() => {
            Err(PipelineError::Validation("image is empty".to_string()))
        }
        Content::Image { mime, .. } if mime.type_() != mime::IMAGE => Err(
            PipelineError::Validation(format!("{} is not an image type", mime)),
        ),
        Content::Record(record) if record.message.trim().is_empty() => {
            Err(PipelineError::Validation("message is empty".to_string()))
        }
        Content::Record(record) if record.author.trim().is_empty() => {
            Err(PipelineError::Validation("author is empty".to_string()))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::crypto::Passphrase;
    use crate::transport::MemoryTransport;

    fn pipeline() -> Pipeline<MemoryTransport> {
        Pipeline::new(MemoryTransport::new(), Namespace::pad(b"unit"), "mocha-4")
            .with_kdf_params(KdfParams::new(256, 1, 1).unwrap())
    }

    fn session(passphrase: &str) -> Session {
        Session::from_passphrase(Passphrase::new(passphrase).unwrap(), None)
    }

    #[tokio::test]
    async fn test_empty_text_rejected() {
        let pipeline = pipeline();
        let err = pipeline
            .post(&session("k"), &Content::text("  "))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Validation(_)));
        assert!(pipeline.transport().is_empty().unwrap());
    }

    #[tokio::test]
    async fn test_non_image_mime_rejected() {
        let content = Content::image("text/plain", vec![1]).unwrap();
        let err = pipeline()
            .post(&session("k"), &content)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Validation(_)));
    }

    #[tokio::test]
    async fn test_invalidated_session() {
        let mut session = session("k");
        session.invalidate();
        let err = pipeline()
            .post(&session, &Content::text("hi"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Session(SessionError::Invalidated)
        ));
    }

    #[tokio::test]
    async fn test_garbage_blob_is_frame_error() {
        let pipeline = pipeline();
        let receipt = pipeline
            .transport()
            .submit(pipeline.namespace(), b"IMG:image/png", "mocha-4")
            .await
            .unwrap();
        let err = pipeline
            .retrieve(&session("k"), &receipt.locator)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Frame(FrameError::UnterminatedMime)));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_receipt_to_record() {
        let pipeline = pipeline();
        let posted = pipeline
            .post(&session("k"), &Content::text("hello"))
            .await
            .unwrap();
        let owner = Uuid::new_v4();
        let record = posted.to_record(owner);
        assert_eq!(record.owner_id, owner);
        assert_eq!(record.content_type, ContentType::Text);
        assert_eq!(&record.locator, posted.locator());
        assert!(record.payload.starts_with("TEXT:"));
    }
}
