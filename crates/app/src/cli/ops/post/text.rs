use clap::Args;

use common::frame::Content;

use super::{submit, PostError, PostOutput};

#[derive(Args, Debug, Clone)]
pub struct Text {
    /// Message to encrypt and post
    #[arg(long, short)]
    pub message: String,
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Text {
    type Error = PostError;
    type Output = PostOutput;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        submit(ctx, Content::text(self.message.clone())).await
    }
}
