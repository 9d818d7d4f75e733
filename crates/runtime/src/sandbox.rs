//! Sandboxed file writes.
//!
//! Every path handed to the model-facing file tool is resolved under a
//! fixed root. Absolute prefixes are dropped and `..` can only climb back
//! to the root, never above it.

use anyhow::{Context, Result};
use std::path::{Component, Path, PathBuf};

/// Resolve `filepath` to a location under `root`.
///
/// A path already starting with `root` keeps its remainder.
pub fn resolve(root: &Path, filepath: &str) -> PathBuf {
    let path = Path::new(filepath);
    let relative = path.strip_prefix(root).unwrap_or(path);

    let mut clean = PathBuf::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => clean.push(part),
            Component::ParentDir => {
                clean.pop();
            }
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }

    root.join(clean)
}

/// Write `content` to `filepath` under `root`, creating parent directories.
///
/// Returns `None` without touching the filesystem when `content` is empty.
pub fn save(root: &Path, content: &str, filepath: &str) -> Result<Option<PathBuf>> {
    if content.is_empty() {
        tracing::warn!("no content to save to {filepath}");
        return Ok(None);
    }

    let path = resolve(root, filepath);
    if path == root {
        anyhow::bail!("'{filepath}' does not name a file");
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }

    tracing::info!("saving content to {}", path.display());
    std::fs::write(&path, content)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(Some(path))
}
