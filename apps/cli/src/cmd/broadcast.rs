//! Broadcast command.

use anyhow::Result;
use ccore::Gateway;
use clap::Args;
use runtime::{Context, Orchestrator};
use tokio_util::sync::CancellationToken;

/// Send one message to several agents at once.
#[derive(Args, Debug)]
pub struct Broadcast {
    /// Subject of an agent to register (repeatable).
    #[arg(long = "agent", required = true)]
    pub agents: Vec<String>,

    /// Message to broadcast.
    pub message: String,
}

impl Broadcast {
    /// Register the agents, broadcast, print every reply.
    ///
    /// Ctrl+C abandons agents that have not answered yet.
    pub async fn run<G: Gateway>(self, ctx: Context<G>) -> Result<()> {
        let mut orchestrator = Orchestrator::new(ctx).await?;
        for subject in &self.agents {
            let status = orchestrator.add_agent(subject, None).await?;
            tracing::info!("{status}");
        }

        let cancel = CancellationToken::new();
        let on_interrupt = cancel.clone();
        let watcher = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                on_interrupt.cancel();
            }
        });

        let replies = orchestrator.broadcast_with(&self.message, cancel).await;
        watcher.abort();

        for (subject, reply) in &replies {
            println!("[{subject}]\n{reply}\n");
        }
        orchestrator.close().await?;
        Ok(())
    }
}
