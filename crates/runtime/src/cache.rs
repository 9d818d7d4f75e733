//! Subject prompt cache.
//!
//! Maps a normalized subject to its generated system prompt. Backed by a
//! single JSON object on disk so later sessions reuse earlier generations.
//! Each key is generated at most once, also when several agents for the
//! same new subject are created concurrently.

use crate::transcript::safe_name;
use anyhow::{Context, Result};
use parking_lot::Mutex;
use std::{
    collections::BTreeMap,
    fs::OpenOptions,
    io::Write,
    path::{Path, PathBuf},
    sync::Arc,
};
use tempfile::NamedTempFile;
use tokio::sync::OnceCell;

/// File-backed subject → prompt store.
pub struct PromptCache {
    path: PathBuf,
    cells: Mutex<BTreeMap<String, Arc<OnceCell<String>>>>,
}

impl PromptCache {
    /// Open the cache at `path`, loading whatever it already holds.
    ///
    /// A missing, empty or malformed file is an empty cache.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let cells = read_entries(&path)
            .into_iter()
            .map(|(key, prompt)| (key, Arc::new(OnceCell::new_with(Some(prompt)))))
            .collect();

        Self {
            path,
            cells: Mutex::new(cells),
        }
    }

    /// The backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Cached prompt for `subject`, if any.
    pub fn get(&self, subject: &str) -> Option<String> {
        self.cells
            .lock()
            .get(&safe_name(subject))
            .and_then(|cell| cell.get().cloned())
    }

    /// Number of cached prompts.
    pub fn len(&self) -> usize {
        self.cells
            .lock()
            .values()
            .filter(|cell| cell.initialized())
            .count()
    }

    /// Whether nothing is cached yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return the prompt for `subject`, running `generate` on a miss.
    ///
    /// Concurrent callers for the same subject wait for a single
    /// generation. A failed generation leaves the key empty so a later
    /// call can retry.
    pub async fn get_or_create<F, Fut>(&self, subject: &str, generate: F) -> Result<String>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String>>,
    {
        let key = safe_name(subject);
        let cell = self.cells.lock().entry(key.clone()).or_default().clone();

        cell.get_or_try_init(|| async {
            // Another process may have filled the key since we opened.
            if let Some(prompt) = read_entries(&self.path).remove(&key) {
                tracing::debug!("prompt for '{key}' found on disk");
                return anyhow::Ok(prompt);
            }

            tracing::info!("generating system prompt for '{key}'");
            let prompt = generate().await?;
            self.persist(&key, &prompt)?;
            anyhow::Ok(prompt)
        })
        .await
        .cloned()
    }

    /// Merge one entry into the backing file.
    ///
    /// The read-merge-write runs under an exclusive lock on a sibling
    /// `.lock` file, so every handle on the same path (in this process or
    /// another) keeps the entries the others wrote.
    fn persist(&self, key: &str, prompt: &str) -> Result<()> {
        let parent = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;

        let lock_path = lock_path(&self.path);
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .with_context(|| format!("failed to open {}", lock_path.display()))?;
        let mut lock = fd_lock::RwLock::new(file);
        let _held = lock
            .write()
            .with_context(|| format!("failed to lock {}", lock_path.display()))?;

        let mut entries = read_entries(&self.path);
        entries.insert(key.to_owned(), prompt.to_owned());
        let body = serde_json::to_string_pretty(&entries)?;

        let mut staging = NamedTempFile::new_in(parent)
            .with_context(|| format!("failed to stage in {}", parent.display()))?;
        staging
            .write_all(body.as_bytes())
            .with_context(|| format!("failed to write {}", staging.path().display()))?;
        staging
            .persist(&self.path)
            .with_context(|| format!("failed to replace {}", self.path.display()))?;
        Ok(())
    }
}

/// `{path}.lock`, guarding writes to `path`.
fn lock_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".lock");
    PathBuf::from(name)
}

fn read_entries(path: &Path) -> BTreeMap<String, String> {
    let Ok(text) = std::fs::read_to_string(path) else {
        return BTreeMap::new();
    };
    if text.trim().is_empty() {
        return BTreeMap::new();
    }

    match serde_json::from_str(&text) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!("ignoring malformed prompt cache {}: {e}", path.display());
            BTreeMap::new()
        }
    }
}
