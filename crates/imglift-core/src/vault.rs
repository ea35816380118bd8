//! Vault file inventory
//!
//! Walks a vault root once and records every file it contains, so declared
//! link paths can be matched against real files without guessing at the
//! author's working directory or path separators. Lookup is a suffix match:
//! `images/cat.png` finds `<root>/notes/images/cat.png`.

use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// How declared paths are compared against indexed paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaseSensitivity {
    /// Fold both sides to lowercase before comparing (default; matches
    /// authors who type `screenshot.png` for `Screenshot.PNG`)
    #[default]
    Insensitive,
    /// Compare byte-for-byte
    Sensitive,
}

#[derive(Debug, Clone)]
struct IndexEntry {
    /// Absolute path on disk
    full: PathBuf,
    /// Vault-relative path with `/` separators
    relative: String,
}

/// Inventory of every file under a vault root.
#[derive(Debug, Clone)]
pub struct VaultIndex {
    entries: Vec<IndexEntry>,
    case: CaseSensitivity,
}

impl VaultIndex {
    /// Walk `root` and build an index of all files, skipping hidden
    /// directories (`.obsidian`, `.git`, ...).
    pub fn scan(root: &Path, case: CaseSensitivity) -> Self {
        let mut entries = Vec::new();

        for entry in WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden_dir(e.path()))
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }
            let full = entry.path().to_path_buf();
            let relative = match full.strip_prefix(root) {
                Ok(rel) => normalize(&rel.to_string_lossy()),
                Err(_) => continue,
            };
            entries.push(IndexEntry { full, relative });
        }

        debug!(files = entries.len(), root = %root.display(), "scanned vault");
        Self { entries, case }
    }

    /// Number of indexed files.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find the first indexed file whose vault-relative path ends with the
    /// declared path. The match must start at a path-component boundary, so
    /// `cat.png` does not match `bobcat.png`.
    pub fn lookup(&self, declared: &str) -> Option<&Path> {
        let wanted = normalize(declared);
        let wanted = wanted.trim_start_matches("./");
        if wanted.is_empty() {
            return None;
        }

        self.entries
            .iter()
            .find(|entry| self.suffix_matches(&entry.relative, wanted))
            .map(|entry| entry.full.as_path())
    }

    fn suffix_matches(&self, relative: &str, wanted: &str) -> bool {
        let (relative, wanted) = match self.case {
            CaseSensitivity::Sensitive => (relative.to_string(), wanted.to_string()),
            CaseSensitivity::Insensitive => (relative.to_lowercase(), wanted.to_lowercase()),
        };
        if !relative.ends_with(&wanted) {
            return false;
        }
        let boundary = relative.len() - wanted.len();
        boundary == 0 || relative.as_bytes()[boundary - 1] == b'/'
    }
}

/// Normalize declared and indexed paths to `/` separators.
fn normalize(path: &str) -> String {
    path.replace('\\', "/")
}

fn is_hidden_dir(path: &Path) -> bool {
    path.is_dir()
        && path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with('.'))
}
