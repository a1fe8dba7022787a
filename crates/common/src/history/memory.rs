use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use uuid::Uuid;

use super::{HistoryError, HistoryStore, StoredRecord};

/// In-memory history store
#[derive(Debug, Clone, Default)]
pub struct MemoryHistoryStore {
    inner: Arc<RwLock<HashMap<Uuid, Vec<StoredRecord>>>>,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryHistoryStoreError {
    #[error("memory history store error: {0}")]
    Internal(String),
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(e: impl std::fmt::Display) -> HistoryError<MemoryHistoryStoreError> {
    HistoryError::Store(MemoryHistoryStoreError::Internal(format!(
        "failed to acquire lock: {}",
        e
    )))
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    type Error = MemoryHistoryStoreError;

    async fn append(&self, record: &StoredRecord) -> Result<(), HistoryError<Self::Error>> {
        let mut inner = self.inner.write().map_err(lock_error)?;
        let records = inner.entry(record.owner_id).or_default();
        if records.iter().any(|r| r.locator == record.locator) {
            return Err(HistoryError::Duplicate(record.locator.clone()));
        }
        records.push(record.clone());
        Ok(())
    }

    async fn list(&self, owner_id: Uuid) -> Result<Vec<StoredRecord>, HistoryError<Self::Error>> {
        let inner = self.inner.read().map_err(lock_error)?;
        let mut records = inner.get(&owner_id).cloned().unwrap_or_default();
        // appends are in order, so newest is last; stable on equal timestamps
        records.reverse();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }
}
