use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use tokio::time::Instant;

use common::frame::{Content, ContentType};
use common::pipeline::{Pipeline, PipelineError, Retrieved};
use common::session::Session;
use common::transport::{BlobTransport, Locator};

use crate::cli::op::{ContextError, OpContext};

/// Pause between attempts while waiting for a blob to be included
pub const POLL_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Args, Debug, Clone)]
pub struct Fetch {
    /// Block height the blob was included at
    #[arg(long)]
    pub height: u64,

    /// Blob commitment returned when it was posted
    #[arg(long)]
    pub commitment: String,

    /// Write a fetched image to this file
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Keep retrying for up to this many seconds while the blob is not found
    #[arg(long, value_name = "SECS")]
    pub wait: Option<u64>,
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error(transparent)]
    Context(#[from] ContextError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error("failed to write {0}: {1}")]
    Write(String, std::io::Error),
}

/// Retrieve `locator`, retrying `NotFound` until `wait` has passed
///
/// A `wait` too large to represent as a deadline retries without limit.
pub async fn retrieve_with_wait<T: BlobTransport>(
    pipeline: &Pipeline<T>,
    session: &Session,
    locator: &Locator,
    wait: Duration,
    interval: Duration,
) -> Result<Retrieved, PipelineError> {
    let deadline = Instant::now().checked_add(wait);
    loop {
        match pipeline.retrieve(session, locator).await {
            Err(e) if e.is_retryable() => {
                let pause = match deadline {
                    Some(deadline) => {
                        let now = Instant::now();
                        if now >= deadline {
                            return Err(e);
                        }
                        interval.min(deadline - now)
                    }
                    None => interval,
                };
                tracing::info!(%locator, "blob not available yet, retrying in {:?}", pause);
                tokio::time::sleep(pause).await;
            }
            result => return result,
        }
    }
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Fetch {
    type Error = FetchError;
    type Output = String;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let state = ctx.state().map_err(ContextError::from)?;
        let session = ctx.session(&state)?;
        let pipeline = ctx.pipeline(&state)?;

        let locator = Locator::new(self.height, self.commitment.clone());
        let wait = Duration::from_secs(self.wait.unwrap_or(0));
        let retrieved =
            retrieve_with_wait(&pipeline, &session, &locator, wait, POLL_INTERVAL).await?;

        let legacy = if retrieved.content_type == ContentType::Legacy {
            " (legacy, untagged)"
        } else {
            ""
        };

        match retrieved.content {
            Content::Text(message) => Ok(format!("Text{}:\n{}", legacy, message)),
            Content::Image { mime, data } => match &self.out {
                Some(path) => {
                    tokio::fs::write(path, &data)
                        .await
                        .map_err(|e| FetchError::Write(path.display().to_string(), e))?;
                    Ok(format!(
                        "Image ({}, {} bytes) written to {}",
                        mime,
                        data.len(),
                        path.display()
                    ))
                }
                None => Ok(format!(
                    "Image ({}, {} bytes). Pass --out to save it",
                    mime,
                    data.len()
                )),
            },
            Content::Record(record) => Ok(format!(
                "Board record{}:\n  author: {}\n  time:   {}\n  {}",
                legacy, record.author, record.timestamp, record.message
            )),
        }
    }
}
