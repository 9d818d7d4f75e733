//! Conclave runtime: persona agents and the orchestrator that routes
//! between them.
//!
//! An [`Agent`] owns one conversation bound to a subject. The
//! [`Orchestrator`] composes an agent with a registry of other agents and
//! a larger [`Toolbox`], so the model can create agents, talk to one of
//! them, or broadcast to all of them at once.
//!
//! # Example
//!
//! ```rust,ignore
//! use conclave_runtime::{Config, Context, Orchestrator};
//!
//! let ctx = Context::new(gateway, Config::default());
//! let mut orchestrator = Orchestrator::new(ctx).await?;
//! let reply = orchestrator.chat("Plan a puzzle game", false).await?;
//! orchestrator.close().await?;
//! ```

pub use {
    agent::{Agent, DEFAULT_SUBJECT},
    cache::PromptCache,
    config::{Config, MissingAgent, Paths},
    context::Context,
    orchestrator::{ORCHESTRATOR_SUBJECT, Orchestrator},
    participant::Participant,
    search::{DuckDuckGo, SEARCH_EMPTY, SEARCH_FAILED, Search},
    toolbox::{Handler, Toolbox},
    transcript::{Transcript, list_files, safe_name},
};

mod agent;
pub mod builtin;
mod cache;
mod config;
mod context;
mod orchestrator;
mod participant;
pub mod sandbox;
mod search;
pub mod toolbox;
mod transcript;
