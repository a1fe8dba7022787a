use std::fmt;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::codec::CodecError;
use crate::namespace::Namespace;

mod memory;
mod twinkle;

pub use memory::MemoryTransport;
pub use twinkle::{ApiRequest, TwinkleClient, DEFAULT_API_URL, DEFAULT_NETWORK};

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
    #[error("HTTP status {0}: {1}")]
    HttpStatus(StatusCode, String),
    /// Nothing is stored at the locator (yet)
    #[error("no blob at {0}")]
    NotFound(Locator),
    #[error("invalid API key: {0}")]
    InvalidApiKey(String),
    #[error("invalid blob encoding in response: {0}")]
    Codec(#[from] CodecError),
    #[error("transport error: {0}")]
    Internal(String),
}

/// Where a blob lives on the network
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator {
    pub height: u64,
    pub commitment: String,
}

impl Locator {
    pub fn new(height: u64, commitment: impl Into<String>) -> Self {
        Self {
            height,
            commitment: commitment.into(),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "height {} commitment {}", self.height, self.commitment)
    }
}

/// Block explorer links returned alongside a submission
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockExplorer {
    #[serde(default)]
    pub transaction: Option<String>,
    #[serde(default)]
    pub block: Option<String>,
}

/// Everything the network tells us about an accepted blob
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitReceipt {
    pub locator: Locator,
    pub transaction_id: Option<String>,
    pub fee_usd_cents: Option<f64>,
    pub request_id: Option<String>,
    pub explorer: BlockExplorer,
}

/// A blob returned by a namespace listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedBlob {
    pub locator: Locator,
    pub data: Vec<u8>,
}

/// A store of opaque blobs addressed by namespace, height and commitment
///
/// Writes become readable asynchronously: a fetch issued right after a
///  submit may report `NotFound` until the blob is included in a block.
#[async_trait]
pub trait BlobTransport: Send + Sync + fmt::Debug {
    /// Submit a blob and return where it landed
    async fn submit(
        &self,
        namespace: &Namespace,
        data: &[u8],
        network: &str,
    ) -> Result<SubmitReceipt, TransportError>;

    /// Fetch the raw bytes at `locator`
    async fn fetch(
        &self,
        namespace: &Namespace,
        locator: &Locator,
        network: &str,
    ) -> Result<Vec<u8>, TransportError>;

    /// Every blob currently visible in `namespace`
    async fn list(
        &self,
        namespace: &Namespace,
        network: &str,
    ) -> Result<Vec<ListedBlob>, TransportError>;
}
