use async_trait::async_trait;
use sqlx::Row;
use time::OffsetDateTime;
use uuid::Uuid;

use common::frame::ContentType;
use common::history::{HistoryError, HistoryStore, StoredRecord};
use common::transport::Locator;

use super::Database;

fn decode_error(e: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> sqlx::Error {
    sqlx::Error::Decode(e.into())
}

#[async_trait]
impl HistoryStore for Database {
    type Error = sqlx::Error;

    async fn append(&self, record: &StoredRecord) -> Result<(), HistoryError<Self::Error>> {
        let result = sqlx::query(
            r#"
            INSERT INTO posts (
                owner_id, content_type, payload, block_height, commitment,
                tx_id, gas_fee_cents, twinkle_request_id,
                block_explorer_tx_url, block_explorer_block_url, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.owner_id.to_string())
        .bind(record.content_type.to_string())
        .bind(&record.payload)
        .bind(record.locator.height as i64)
        .bind(&record.locator.commitment)
        .bind(&record.transaction_id)
        .bind(record.fee_usd_cents)
        .bind(&record.request_id)
        .bind(&record.explorer_transaction_url)
        .bind(&record.explorer_block_url)
        .bind(record.created_at)
        .execute(&**self)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(HistoryError::Duplicate(record.locator.clone()))
            }
            Err(e) => Err(HistoryError::Store(e)),
        }
    }

    async fn list(&self, owner_id: Uuid) -> Result<Vec<StoredRecord>, HistoryError<Self::Error>> {
        let rows = sqlx::query(
            r#"
            SELECT owner_id, content_type, payload, block_height, commitment,
                   tx_id, gas_fee_cents, twinkle_request_id,
                   block_explorer_tx_url, block_explorer_block_url, created_at
            FROM posts
            WHERE owner_id = ?
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(owner_id.to_string())
        .fetch_all(&**self)
        .await?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let owner: String = row.try_get("owner_id")?;
            let content_type: String = row.try_get("content_type")?;
            let height: i64 = row.try_get("block_height")?;
            let created_at: OffsetDateTime = row.try_get("created_at")?;

            records.push(StoredRecord {
                owner_id: Uuid::parse_str(&owner).map_err(decode_error)?,
                locator: Locator::new(height as u64, row.try_get::<String, _>("commitment")?),
                content_type: content_type
                    .parse::<ContentType>()
                    .map_err(decode_error)?,
                payload: row.try_get("payload")?,
                transaction_id: row.try_get("tx_id")?,
                fee_usd_cents: row.try_get("gas_fee_cents")?,
                request_id: row.try_get("twinkle_request_id")?,
                explorer_transaction_url: row.try_get("block_explorer_tx_url")?,
                explorer_block_url: row.try_get("block_explorer_block_url")?,
                created_at,
            });
        }
        Ok(records)
    }
}
