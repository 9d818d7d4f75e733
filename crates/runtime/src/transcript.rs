//! Conversation transcripts persisted at session close.

use anyhow::{Context, Result};
use ccore::Message;
use serde::{Deserialize, Serialize};
use std::{
    fs::OpenOptions,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

/// Timestamp format used in transcript names and bodies.
const TIMESTAMP: &str = "%Y%m%d_%H%M%S";

/// Stem used when a subject has no file-safe characters.
const FALLBACK_STEM: &str = "chat_log";

/// A saved conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    /// The full ordered history.
    pub messages: Vec<Message>,
    /// When the transcript was written (`YYYYMMDD_HHMMSS`).
    pub timestamp: String,
}

impl Transcript {
    /// Snapshot `messages` with the current local time.
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            timestamp: chrono::Local::now().format(TIMESTAMP).to_string(),
        }
    }

    /// Write to `{dir}/{safe_subject}_{timestamp}.json`.
    ///
    /// Existing files are never replaced: a taken name gets a `_1`, `_2`, ...
    /// suffix before the extension.
    pub fn save(&self, dir: &Path, subject: &str) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create log directory {}", dir.display()))?;

        let stem = format!("{}_{}", safe_name(subject), self.timestamp);
        let body = serde_json::to_string_pretty(self)?;
        let mut attempt = 0usize;
        loop {
            let name = match attempt {
                0 => format!("{stem}.json"),
                n => format!("{stem}_{n}.json"),
            };
            let path = dir.join(name);
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    file.write_all(body.as_bytes())
                        .with_context(|| format!("failed to write transcript {}", path.display()))?;
                    return Ok(path);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => attempt += 1,
                Err(e) => {
                    return Err(e)
                        .with_context(|| format!("failed to create transcript {}", path.display()));
                }
            }
        }
    }

    /// Read a transcript back.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read transcript {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("malformed transcript {}", path.display()))
    }

    /// Transcript files in `dir`, sorted by name.
    pub fn list(dir: &Path) -> Vec<PathBuf> {
        list_files(dir, "json")
    }
}

/// Files with extension `ext` in `dir`, sorted by name.
///
/// A missing or unreadable directory yields nothing.
pub fn list_files(dir: &Path, ext: &str) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut files: Vec<_> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && path.extension().is_some_and(|e| e == ext))
        .collect();
    files.sort();
    files
}

/// File-safe, lowercase form of a subject.
///
/// Letters, digits, spaces and underscores are kept, everything else
/// becomes `_`; surrounding whitespace is trimmed and inner spaces become
/// underscores.
pub fn safe_name(subject: &str) -> String {
    let kept: String = subject
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == ' ' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    let name = kept.trim().replace(' ', "_").to_lowercase();
    if name.is_empty() {
        FALLBACK_STEM.to_owned()
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_name_replaces_punctuation() {
        assert_eq!(safe_name("AI Agents Orchestrator"), "ai_agents_orchestrator");
        assert_eq!(safe_name(" C++ dev/ops "), "c___dev_ops");
        assert_eq!(safe_name("data_scientist"), "data_scientist");
    }

    #[test]
    fn safe_name_falls_back_when_empty() {
        assert_eq!(safe_name("   "), FALLBACK_STEM);
        assert_eq!(safe_name(""), FALLBACK_STEM);
    }

    #[test]
    fn timestamp_has_expected_shape() {
        let transcript = Transcript::new(Vec::new());
        assert_eq!(transcript.timestamp.len(), 15);
        assert_eq!(transcript.timestamp.as_bytes()[8], b'_');
    }
}
