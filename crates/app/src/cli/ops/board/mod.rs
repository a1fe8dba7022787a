use clap::{Args, Subcommand};

pub mod post;
pub mod read;

use crate::cli::op::{Op, OpContext};

crate::command_enum! {
    (Post, post::PostRecord),
    (Read, read::Read),
}

// Rename the generated Command to BoardCommand for clarity
pub type BoardCommand = Command;

/// Bulletin board: short JSON posts readable by anyone with the passphrase
#[derive(Args, Debug, Clone)]
pub struct Board {
    #[command(subcommand)]
    pub command: BoardCommand,
}

#[async_trait::async_trait]
impl Op for Board {
    type Error = OpError;
    type Output = OpOutput;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        self.command.execute(ctx).await
    }
}
