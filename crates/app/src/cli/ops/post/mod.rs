use std::fmt;

use clap::{Args, Subcommand};

pub mod image;
pub mod text;

use common::frame::{Content, FrameError};
use common::history::record_post;
use common::pipeline::{PipelineError, PostReceipt};

use crate::cli::op::{ContextError, Op, OpContext};

crate::command_enum! {
    (Text, text::Text),
    (Image, image::Image),
}

// Rename the generated Command to PostCommand for clarity
pub type PostCommand = Command;

#[derive(Args, Debug, Clone)]
pub struct Post {
    #[command(subcommand)]
    pub command: PostCommand,
}

#[async_trait::async_trait]
impl Op for Post {
    type Error = OpError;
    type Output = OpOutput;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        self.command.execute(ctx).await
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PostError {
    #[error(transparent)]
    Context(#[from] ContextError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error("invalid content: {0}")]
    Frame(#[from] FrameError),
    #[error("failed to read {0}: {1}")]
    Read(String, std::io::Error),
    #[error("could not determine an image MIME type for {0}, pass --mime")]
    UnknownMime(String),
}

#[derive(Debug)]
pub struct PostOutput {
    pub receipt: PostReceipt,
    pub network: String,
    /// Whether the post made it into local history
    pub recorded: bool,
}

impl fmt::Display for PostOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let receipt = &self.receipt.receipt;
        writeln!(
            f,
            "Posted {} to {}",
            self.receipt.content_type(),
            self.network
        )?;
        writeln!(f, "  height:      {}", receipt.locator.height)?;
        write!(f, "  commitment:  {}", receipt.locator.commitment)?;
        if let Some(tx) = &receipt.transaction_id {
            write!(f, "\n  transaction: {}", tx)?;
        }
        if let Some(cents) = receipt.fee_usd_cents {
            write!(f, "\n  fee:         ${:.4}", cents / 100.0)?;
        }
        if let Some(request_id) = &receipt.request_id {
            write!(f, "\n  request id:  {}", request_id)?;
        }
        if let Some(url) = &receipt.explorer.transaction {
            write!(f, "\n  explorer:    {}", url)?;
        }
        if !self.recorded {
            write!(f, "\n  (not saved to local history)")?;
        }
        Ok(())
    }
}

/// Encrypt, submit and record `content` with the context's key and config
pub async fn submit(ctx: &OpContext, content: Content) -> Result<PostOutput, PostError> {
    let state = ctx.state().map_err(ContextError::from)?;
    let session = ctx.session(&state)?;
    let pipeline = ctx.pipeline(&state)?;

    let receipt = pipeline.post(&session, &content).await?;

    let recorded = match ctx.database(&state).await {
        Ok(db) => record_post(&db, &receipt.to_record(state.config.owner_id)).await,
        Err(e) => {
            tracing::warn!("history unavailable: {}", e);
            false
        }
    };

    Ok(PostOutput {
        receipt,
        network: pipeline.network().to_string(),
        recorded,
    })
}
