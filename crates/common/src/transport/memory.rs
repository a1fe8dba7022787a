use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use uuid::Uuid;

use super::{BlobTransport, BlockExplorer, ListedBlob, Locator, SubmitReceipt, TransportError};
use crate::codec;
use crate::namespace::Namespace;

/// In-process blob store with the same addressing as the network
///
/// Every submit lands in its own block. Locators listed in `pending` are
///  hidden from fetch and list until `include` is called, which lets tests
///  exercise the window between submission and inclusion.
#[derive(Debug, Clone, Default)]
pub struct MemoryTransport {
    inner: Arc<RwLock<MemoryTransportInner>>,
}

#[derive(Debug, Default)]
struct MemoryTransportInner {
    height: u64,
    blobs: Vec<StoredBlob>,
    pending: HashSet<Locator>,
    hold_submissions: bool,
}

#[derive(Debug, Clone)]
struct StoredBlob {
    network: String,
    namespace: Namespace,
    locator: Locator,
    data: Vec<u8>,
}

fn lock_error(e: impl std::fmt::Display) -> TransportError {
    TransportError::Internal(format!("failed to acquire lock: {}", e))
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep new submissions pending until `include` is called
    pub fn hold_submissions(&self, hold: bool) -> Result<(), TransportError> {
        let mut inner = self.inner.write().map_err(lock_error)?;
        inner.hold_submissions = hold;
        Ok(())
    }

    /// Make a pending blob visible
    pub fn include(&self, locator: &Locator) -> Result<bool, TransportError> {
        let mut inner = self.inner.write().map_err(lock_error)?;
        Ok(inner.pending.remove(locator))
    }

    /// Number of stored blobs, pending included
    pub fn len(&self) -> Result<usize, TransportError> {
        Ok(self.inner.read().map_err(lock_error)?.blobs.len())
    }

    pub fn is_empty(&self) -> Result<bool, TransportError> {
        Ok(self.len()? == 0)
    }
}

#[async_trait]
impl BlobTransport for MemoryTransport {
    async fn submit(
        &self,
        namespace: &Namespace,
        data: &[u8],
        network: &str,
    ) -> Result<SubmitReceipt, TransportError> {
        let mut inner = self.inner.write().map_err(lock_error)?;
        inner.height += 1;

        let mut commitment = Uuid::new_v4().as_bytes().to_vec();
        commitment.extend_from_slice(Uuid::new_v4().as_bytes());
        let locator = Locator::new(inner.height, codec::to_base64(&commitment));

        if inner.hold_submissions {
            inner.pending.insert(locator.clone());
        }
        inner.blobs.push(StoredBlob {
            network: network.to_string(),
            namespace: *namespace,
            locator: locator.clone(),
            data: data.to_vec(),
        });

        Ok(SubmitReceipt {
            locator,
            transaction_id: Some(Uuid::new_v4().simple().to_string()),
            fee_usd_cents: Some(0.0),
            request_id: Some(Uuid::new_v4().to_string()),
            explorer: BlockExplorer::default(),
        })
    }

    async fn fetch(
        &self,
        namespace: &Namespace,
        locator: &Locator,
        network: &str,
    ) -> Result<Vec<u8>, TransportError> {
        let inner = self.inner.read().map_err(lock_error)?;
        if inner.pending.contains(locator) {
            return Err(TransportError::NotFound(locator.clone()));
        }
        inner
            .blobs
            .iter()
            .find(|blob| {
                blob.network == network && blob.namespace == *namespace && blob.locator == *locator
            })
            .map(|blob| blob.data.clone())
            .ok_or_else(|| TransportError::NotFound(locator.clone()))
    }

    async fn list(
        &self,
        namespace: &Namespace,
        network: &str,
    ) -> Result<Vec<ListedBlob>, TransportError> {
        let inner = self.inner.read().map_err(lock_error)?;
        Ok(inner
            .blobs
            .iter()
            .filter(|blob| {
                blob.network == network
                    && blob.namespace == *namespace
                    && !inner.pending.contains(&blob.locator)
            })
            .map(|blob| ListedBlob {
                locator: blob.locator.clone(),
                data: blob.data.clone(),
            })
            .collect())
    }
}
