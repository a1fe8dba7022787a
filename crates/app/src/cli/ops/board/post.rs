use clap::Args;

use common::board::BoardRecord;
use common::frame::Content;

use crate::cli::ops::post::{submit, PostError, PostOutput};

#[derive(Args, Debug, Clone)]
pub struct PostRecord {
    /// Message to post to the board
    #[arg(long, short)]
    pub message: String,

    /// Name to sign the post with
    #[arg(long, short, default_value = "anonymous")]
    pub author: String,
}

#[async_trait::async_trait]
impl crate::cli::op::Op for PostRecord {
    type Error = PostError;
    type Output = PostOutput;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let record = BoardRecord::new(self.author.clone(), self.message.clone());
        submit(ctx, Content::Record(record)).await
    }
}
