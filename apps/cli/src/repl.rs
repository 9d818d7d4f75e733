//! Interactive chat REPL with persistent line history.

use anyhow::Result;
use ccore::Gateway;
use runtime::Orchestrator;
use rustyline::error::ReadlineError;
use std::path::PathBuf;

/// Prompt shown before each user turn.
const PROMPT: &str = "You: ";

/// What a line typed at the prompt asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// End the session.
    Exit,
    /// Chat with the orchestrator.
    Message {
        /// Text to send.
        text: String,
        /// Brainstorm before answering.
        complex: bool,
    },
}

impl Input {
    /// Interpret a line.
    ///
    /// `exit`, `quit` (any case) and blank lines end the session. A
    /// leading `*` asks for a brainstormed answer.
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() || line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit")
        {
            return Input::Exit;
        }

        match line.strip_prefix('*') {
            Some(rest) => Input::Message {
                text: rest.trim().to_owned(),
                complex: true,
            },
            None => Input::Message {
                text: line.to_owned(),
                complex: false,
            },
        }
    }
}

/// Interactive chat REPL over an orchestrator.
pub struct ChatRepl {
    editor: rustyline::DefaultEditor,
    history_path: Option<PathBuf>,
}

impl ChatRepl {
    /// Create a new REPL, loading earlier line history.
    pub fn new() -> Result<Self> {
        let mut editor = rustyline::DefaultEditor::new()?;
        let history_path = history_file_path();
        if let Some(ref path) = history_path {
            let _ = editor.load_history(path);
        }
        Ok(Self {
            editor,
            history_path,
        })
    }

    /// Print the banner.
    pub fn greet(&self) {
        println!("Conclave chat");
        println!("Type 'exit' or 'quit' (or an empty line) to end, prefix with '*' to brainstorm.");
        println!("---");
    }

    /// Read one line; `None` once input ended or was interrupted.
    pub fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(Some(line)),
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Run the chat loop until the user leaves.
    ///
    /// A failed turn is reported and the loop continues; Ctrl+C while
    /// waiting for an answer ends the session.
    pub async fn run<G: Gateway>(&mut self, orchestrator: &mut Orchestrator<G>) -> Result<()> {
        loop {
            let Some(line) = self.read_line(PROMPT)? else {
                break;
            };
            let Input::Message { text, complex } = Input::parse(&line) else {
                break;
            };
            let _ = self.editor.add_history_entry(line.trim());

            tokio::select! {
                reply = orchestrator.chat(&text, complex) => match reply {
                    Ok(reply) => println!("Assistant: {reply}"),
                    Err(e) => eprintln!("Error: {e}"),
                },
                _ = tokio::signal::ctrl_c() => {
                    println!();
                    break;
                }
            }
        }

        println!("Exiting chat.");
        self.save_history();
        Ok(())
    }

    /// Save readline history to disk.
    fn save_history(&mut self) {
        if let Some(ref path) = self.history_path {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let _ = self.editor.save_history(path);
        }
    }
}

/// Resolve the history file path at `~/.config/conclave/history`.
fn history_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("conclave").join("history"))
}
