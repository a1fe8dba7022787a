use clap::Args;
use time::format_description::well_known::Rfc3339;

use common::history::{HistoryError, HistoryStore, StoredRecord};

use crate::cli::op::ContextError;

#[derive(Args, Debug, Clone)]
pub struct History {
    /// Show at most this many entries
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Debug, thiserror::Error)]
pub enum HistoryOpError {
    #[error(transparent)]
    Context(#[from] ContextError),
    #[error("failed to read history: {0}")]
    Store(#[from] HistoryError<sqlx::Error>),
}

fn render(records: &[StoredRecord]) -> String {
    if records.is_empty() {
        return "No posts yet".to_string();
    }
    let mut lines = Vec::new();
    for record in records {
        let when = record
            .created_at
            .format(&Rfc3339)
            .unwrap_or_else(|_| record.created_at.to_string());
        lines.push(format!("{}  {}", when, record.content_type));
        lines.push(format!("  height:      {}", record.locator.height));
        lines.push(format!("  commitment:  {}", record.locator.commitment));
        if let Some(tx) = &record.transaction_id {
            lines.push(format!("  transaction: {}", tx));
        }
        if let Some(url) = &record.explorer_transaction_url {
            lines.push(format!("  explorer:    {}", url));
        }
    }
    lines.join("\n")
}

#[async_trait::async_trait]
impl crate::cli::op::Op for History {
    type Error = HistoryOpError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let state = ctx.state().map_err(ContextError::from)?;
        let db = ctx.database(&state).await?;

        let mut records = db.list(state.config.owner_id).await?;
        if let Some(limit) = self.limit {
            records.truncate(limit);
        }
        Ok(render(&records))
    }
}
