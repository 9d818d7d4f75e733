//! Interactive chat command.

use crate::{repl::ChatRepl, start};
use anyhow::Result;
use ccore::Gateway;
use clap::Args;
use runtime::{Context, Orchestrator};

/// Start an interactive chat with the orchestrator.
#[derive(Args, Debug)]
pub struct Chat;

impl Chat {
    /// Pick a starting state, run the REPL, then close the session.
    ///
    /// The session is closed however the loop ends.
    pub async fn run<G: Gateway>(self, ctx: Context<G>) -> Result<()> {
        let paths = ctx.config.paths.clone();
        let mut repl = ChatRepl::new()?;
        repl.greet();

        let start = start::pick(&paths, |prompt| repl.read_line(prompt))?;
        let mut orchestrator = Orchestrator::new(ctx).await?;
        start.apply(&mut orchestrator).await?;

        let outcome = repl.run(&mut orchestrator).await;
        for path in orchestrator.close().await? {
            println!("Saved {}", path.display());
        }
        outcome
    }
}
