//! One-shot message command.

use anyhow::Result;
use ccore::Gateway;
use clap::Args;
use runtime::{Context, Orchestrator};

/// Send a single message to the orchestrator.
#[derive(Args, Debug)]
pub struct Send {
    /// Message content.
    pub content: String,

    /// Brainstorm before answering.
    #[arg(long)]
    pub complex: bool,
}

impl Send {
    /// Chat once, close the session and print the reply.
    pub async fn run<G: Gateway>(self, ctx: Context<G>) -> Result<()> {
        let mut orchestrator = Orchestrator::new(ctx).await?;
        let reply = orchestrator.chat(&self.content, self.complex).await;
        orchestrator.close().await?;

        println!("{}", reply?);
        Ok(())
    }
}
