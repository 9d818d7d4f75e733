//! Runtime configuration.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use std::{
    path::{Path, PathBuf},
    time::Duration,
};

/// Runtime settings shared by every agent of a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default model for agents.
    pub model: CompactString,
    /// Model used for chat answers and the brainstorm synthesis.
    pub answer_model: CompactString,
    /// Model used to generate persona system prompts.
    pub prompt_model: CompactString,
    /// Suggestion rounds in complex chat mode.
    pub brainstorm_rounds: usize,
    /// What `send_to_agent` does when the subject is not registered.
    pub missing_agent: MissingAgent,
    /// Upper bound for a single gateway call, in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    /// Filesystem locations.
    pub paths: Paths,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: "o4-mini".into(),
            answer_model: "gpt-4.1".into(),
            prompt_model: "gpt-4.1".into(),
            brainstorm_rounds: 5,
            missing_agent: MissingAgent::Create,
            timeout_secs: None,
            paths: Paths::default(),
        }
    }
}

impl Config {
    /// The gateway timeout, if one is configured.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Policy for messages addressed to an unregistered agent.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingAgent {
    /// Create the agent on the fly.
    #[default]
    Create,
    /// Answer with an error message instead.
    Reject,
}

/// Filesystem locations used by the runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Paths {
    /// Subject prompt cache (a single JSON document).
    pub cache: PathBuf,
    /// Transcript directory.
    pub logs: PathBuf,
    /// Root directory for `save_content_to_file`.
    pub sandbox: PathBuf,
    /// Directory of `.txt` starting prompts.
    pub start: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Self {
            cache: PathBuf::from("agents/subject_cache.json"),
            logs: PathBuf::from("logs"),
            sandbox: PathBuf::from("root"),
            start: PathBuf::from("start"),
        }
    }
}

impl Paths {
    /// Default layout rooted at `dir`.
    pub fn under(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        let defaults = Self::default();
        Self {
            cache: dir.join(defaults.cache),
            logs: dir.join(defaults.logs),
            sandbox: dir.join(defaults.sandbox),
            start: dir.join(defaults.start),
        }
    }
}
