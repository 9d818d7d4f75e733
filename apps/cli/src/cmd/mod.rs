//! CLI argument parsing and subcommand dispatch.

use crate::config;
use anyhow::Result;
use clap::{Parser, Subcommand};
use compact_str::CompactString;
use runtime::Context;
use std::path::PathBuf;

pub mod broadcast;
pub mod chat;
pub mod send;

/// Multi-agent conversations driven by an orchestrator.
#[derive(Parser, Debug)]
#[command(name = "conclave", about = "Multi-agent conversations driven by an orchestrator")]
pub struct Cli {
    /// Subcommand to execute (defaults to `chat`).
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Path to a config file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Default agent model override.
    #[arg(long, global = true)]
    pub model: Option<CompactString>,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start an interactive chat with the orchestrator.
    Chat(chat::Chat),
    /// Send a single message to the orchestrator.
    Send(send::Send),
    /// Send one message to several agents at once.
    Broadcast(broadcast::Broadcast),
}

impl Cli {
    /// Resolve config, connect the gateway and run the subcommand.
    pub async fn run(self) -> Result<()> {
        let mut config = config::resolve_config(self.config.as_deref())?;
        if let Some(model) = self.model {
            config.runtime.model = model;
        }

        let gateway = config.gateway.build()?;
        let ctx = Context::new(gateway, config.runtime);

        match self.command.unwrap_or(Command::Chat(chat::Chat)) {
            Command::Chat(chat) => chat.run(ctx).await,
            Command::Send(send) => send.run(ctx).await,
            Command::Broadcast(broadcast) => broadcast.run(ctx).await,
        }
    }
}
