//! Key lister over a local directory tree
//!
//! Keys are paths relative to the root, `/`-separated on every platform.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::core::ports::KeyLister;

/// Lists the files under a root directory as storage keys
#[derive(Debug, Clone)]
pub struct FilesystemKeyLister {
    root: PathBuf,
}

impl FilesystemKeyLister {
    /// Create a lister rooted at the given directory
    pub fn new(root: impl AsRef<Path>) -> anyhow::Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_dir() {
            anyhow::bail!("not a directory: {}", root.display());
        }
        Ok(Self { root })
    }

    /// Get the root path
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Check if an entry is hidden (starts with .)
    fn is_hidden(entry: &walkdir::DirEntry) -> bool {
        entry.file_name().to_str().is_some_and(|s| s.starts_with('.'))
    }

    fn key_for(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}

impl KeyLister for FilesystemKeyLister {
    fn list_keys(&self, prefix: &str) -> anyhow::Result<Vec<String>> {
        let root = &self.root;
        let mut keys = Vec::new();

        for entry in WalkDir::new(root).follow_links(true).into_iter().filter_entry(|e| {
            // Don't filter the root directory itself
            if e.path() == root {
                return true;
            }
            !Self::is_hidden(e)
        }) {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let key = self.key_for(entry.path());
            if key.starts_with(prefix) {
                keys.push(key);
            }
        }

        // Sort for deterministic output
        keys.sort();
        Ok(keys)
    }
}
