//! Choosing how a chat session starts.
//!
//! A session can open with a prepared prompt from the start directory,
//! continue a saved transcript from the log directory, or start empty.
//! Anything that is not a valid index degrades to the next option.

use anyhow::{Context, Result};
use ccore::{Gateway, Message};
use runtime::{Orchestrator, Paths, Transcript, list_files};
use std::path::{Path, PathBuf};

/// The state a chat session starts from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Start {
    /// Nothing prepared.
    Empty,
    /// A prepared first prompt.
    Prompt(String),
    /// Messages of an earlier session.
    Transcript(Vec<Message>),
}

impl Start {
    /// Load this state into the orchestrator.
    ///
    /// Prepared content is treated as already handled: the save
    /// checkpoint moves past it.
    pub async fn apply<G: Gateway>(self, orchestrator: &mut Orchestrator<G>) -> Result<()> {
        match self {
            Start::Empty => Ok(()),
            Start::Prompt(prompt) => orchestrator.add_user_message(&prompt, true).await,
            Start::Transcript(messages) => {
                orchestrator.restore(messages);
                Ok(())
            }
        }
    }
}

/// Ask for a start prompt, then for a transcript.
///
/// `read_line` shows its argument as a prompt and returns the answer, or
/// `None` when input ended.
pub fn pick<F>(paths: &Paths, mut read_line: F) -> Result<Start>
where
    F: FnMut(&str) -> Result<Option<String>>,
{
    let prompts = list_files(&paths.start, "txt");
    if let Some(path) = choose(&prompts, &mut read_line)? {
        let prompt = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let prompt = prompt.trim();
        if !prompt.is_empty() {
            println!("Starting with content: {}", path.display());
            return Ok(Start::Prompt(prompt.to_owned()));
        }
    }

    let transcripts = list_files(&paths.logs, "json");
    let Some(path) = choose(&transcripts, &mut read_line)? else {
        return Ok(Start::Empty);
    };
    Ok(load_transcript(&path))
}

/// Messages of a saved transcript, or [`Start::Empty`] when it has none
/// or cannot be read.
pub fn load_transcript(path: &Path) -> Start {
    match Transcript::load(path) {
        Ok(transcript) if !transcript.messages.is_empty() => {
            println!("Starting with content from: {}", path.display());
            Start::Transcript(transcript.messages)
        }
        Ok(_) => {
            println!("No messages found in the selected file. Starting with an empty chat.");
            Start::Empty
        }
        Err(e) => {
            tracing::warn!("{e:#}");
            println!("Could not read the selected file. Starting with an empty chat.");
            Start::Empty
        }
    }
}

/// Parse a file index typed by the user.
///
/// Returns `None` for anything that is not an index below `len`.
pub fn select(input: &str, len: usize) -> Option<usize> {
    input.trim().parse().ok().filter(|&index| index < len)
}

fn choose<F>(files: &[PathBuf], read_line: &mut F) -> Result<Option<PathBuf>>
where
    F: FnMut(&str) -> Result<Option<String>>,
{
    if files.is_empty() {
        return Ok(None);
    }

    println!("Enter the index of the file to start with (or press Enter to skip):");
    for (index, file) in files.iter().enumerate() {
        let name = file.file_name().unwrap_or_default().to_string_lossy();
        println!("({index}) - {name}");
    }

    let Some(input) = read_line("> ")? else {
        return Ok(None);
    };
    let choice = select(&input, files.len());
    if choice.is_none() && !input.trim().is_empty() {
        println!("Invalid index. Starting with an empty chat.");
    }
    Ok(choice.map(|index| files[index].clone()))
}
