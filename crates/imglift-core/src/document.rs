//! Document access seam
//!
//! The pipeline reads and writes whole-note text through [`DocumentStore`],
//! so the core never depends on where a note actually lives. The CLI uses
//! [`FsDocumentStore`] for notes on disk; tests substitute in-memory stores.

use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};

/// Read/write access to one note's full text.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read the entire note text.
    async fn read_text(&self) -> io::Result<String>;

    /// Replace the entire note text.
    async fn write_text(&self, text: &str) -> io::Result<()>;
}

/// [`DocumentStore`] backed by a file on disk.
pub struct FsDocumentStore {
    path: PathBuf,
}

impl FsDocumentStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl DocumentStore for FsDocumentStore {
    async fn read_text(&self) -> io::Result<String> {
        tokio::fs::read_to_string(&self.path).await
    }

    async fn write_text(&self, text: &str) -> io::Result<()> {
        tokio::fs::write(&self.path, text).await
    }
}
