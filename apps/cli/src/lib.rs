//! Conclave CLI: chat with the orchestrator, send one-shot requests, or
//! broadcast a message to a set of agents.

pub use cmd::{Cli, Command};

pub mod cmd;
pub mod config;
pub mod repl;
pub mod start;
