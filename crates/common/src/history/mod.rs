use std::fmt::{Debug, Display};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::frame::ContentType;
use crate::transport::{Locator, SubmitReceipt};

mod memory;

pub use memory::{MemoryHistoryStore, MemoryHistoryStoreError};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum HistoryError<T> {
    #[error("unhandled history store error: {0}")]
    Store(#[from] T),
    /// A record for this locator already exists for the owner
    #[error("duplicate history record at {0}")]
    Duplicate(Locator),
}

/// A local note of something we posted
///
/// The network is the source of truth; this only remembers where things
///  went so they can be found again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub owner_id: Uuid,
    pub locator: Locator,
    pub content_type: ContentType,
    /// The encoded frame exactly as submitted
    pub payload: String,
    pub transaction_id: Option<String>,
    pub fee_usd_cents: Option<f64>,
    pub request_id: Option<String>,
    pub explorer_transaction_url: Option<String>,
    pub explorer_block_url: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl StoredRecord {
    pub fn new(
        owner_id: Uuid,
        content_type: ContentType,
        payload: String,
        receipt: &SubmitReceipt,
    ) -> Self {
        Self {
            owner_id,
            locator: receipt.locator.clone(),
            content_type,
            payload,
            transaction_id: receipt.transaction_id.clone(),
            fee_usd_cents: receipt.fee_usd_cents,
            request_id: receipt.request_id.clone(),
            explorer_transaction_url: receipt.explorer.transaction.clone(),
            explorer_block_url: receipt.explorer.block.clone(),
            created_at: OffsetDateTime::now_utc(),
        }
    }
}

/// Append-only store of posted records, keyed by owner
#[async_trait]
pub trait HistoryStore: Send + Sync + Debug + Clone + 'static {
    type Error: Display + Debug + Send;

    /// Append a record
    ///
    /// # Errors
    /// * `Duplicate` if the owner already has a record at the same locator
    async fn append(&self, record: &StoredRecord) -> Result<(), HistoryError<Self::Error>>;

    /// All records for `owner_id`, newest first
    async fn list(&self, owner_id: Uuid) -> Result<Vec<StoredRecord>, HistoryError<Self::Error>>;
}

/// Append to history without failing the caller
///
/// The post already succeeded on the network by the time this runs, so a
///  failed write is logged and reported as `false`.
pub async fn record_post<H: HistoryStore>(history: &H, record: &StoredRecord) -> bool {
    match history.append(record).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(locator = %record.locator, "failed to record post in history: {}", e);
            false
        }
    }
}
