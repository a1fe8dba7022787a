use clap::Args;
use time::format_description::well_known::Rfc3339;

use common::board::BoardEntry;
use common::pipeline::PipelineError;

use crate::cli::op::ContextError;

#[derive(Args, Debug, Clone)]
pub struct Read {
    /// Show at most this many posts
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Debug, thiserror::Error)]
pub enum BoardReadError {
    #[error(transparent)]
    Context(#[from] ContextError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

fn render(entries: &[BoardEntry]) -> String {
    if entries.is_empty() {
        return "No board posts readable with this key".to_string();
    }
    entries
        .iter()
        .map(|entry| {
            let when = entry
                .record
                .timestamp
                .format(&Rfc3339)
                .unwrap_or_else(|_| entry.record.timestamp.to_string());
            format!(
                "[{}] {}: {}\n  (height {}, commitment {})",
                when, entry.record.author, entry.record.message, entry.height, entry.commitment
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Read {
    type Error = BoardReadError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let state = ctx.state().map_err(ContextError::from)?;
        let session = ctx.session(&state)?;
        let pipeline = ctx.pipeline(&state)?;

        let mut entries = pipeline.read_board(&session).await?;
        if let Some(limit) = self.limit {
            entries.truncate(limit);
        }
        Ok(render(&entries))
    }
}

#[cfg(test)]
mod tests {
    use common::board::BoardRecord;
    use time::macros::datetime;

    use super::*;

    #[test]
    fn test_render() {
        assert_eq!(render(&[]), "No board posts readable with this key");

        let entries = vec![BoardEntry {
            height: 7,
            commitment: "abc".to_string(),
            record: BoardRecord {
                author: "ada".to_string(),
                message: "hello board".to_string(),
                timestamp: datetime!(2024-05-01 12:30 UTC),
            },
        }];
        assert_eq!(
            render(&entries),
            "[2024-05-01T12:30:00Z] ada: hello board\n  (height 7, commitment abc)"
        );
    }
}
