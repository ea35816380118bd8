//! Declared-path resolution
//!
//! Decides which extracted links denote local, uploadable images and maps
//! them to concrete files. Remote URLs and non-image extensions are filtered
//! out; everything else is resolved through the [`FileResolver`] seam so the
//! pipeline never touches the filesystem directly.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::links::LinkMatch;
use crate::vault::VaultIndex;

/// Extensions accepted for upload, compared case-insensitively.
pub const IMAGE_EXTENSIONS: [&str; 7] = ["png", "jpg", "jpeg", "bmp", "gif", "svg", "tiff"];

/// Errors from reading a resolved resource.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Resource could not be read from disk
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Opaque handle to a resolved local file.
///
/// Produced by a [`FileResolver`]; the pipeline passes it back to the same
/// resolver to read the bytes and never interprets it itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceHandle(PathBuf);

impl ResourceHandle {
    pub fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

/// A [`LinkMatch`] confirmed to reference an existing local image.
#[derive(Debug, Clone)]
pub struct ResolvedImage {
    /// Handle to the local file
    pub handle: ResourceHandle,
    /// Display name for the upload
    pub name: String,
    /// Exact original link substring, the rewrite key
    pub source: String,
}

/// Maps declared link paths to local resources and reads their content.
#[async_trait]
pub trait FileResolver: Send + Sync {
    /// Resolve a declared path to a local resource, or `None` if no file
    /// matches.
    async fn resolve(&self, declared: &str) -> Option<ResourceHandle>;

    /// Read the full binary content of a previously resolved resource.
    async fn read(&self, handle: &ResourceHandle) -> Result<Vec<u8>, ResolveError>;
}

/// [`FileResolver`] backed by a [`VaultIndex`] suffix lookup.
pub struct VaultResolver {
    index: VaultIndex,
}

impl VaultResolver {
    pub fn new(index: VaultIndex) -> Self {
        Self { index }
    }
}

#[async_trait]
impl FileResolver for VaultResolver {
    async fn resolve(&self, declared: &str) -> Option<ResourceHandle> {
        self.index
            .lookup(declared)
            .map(|path| ResourceHandle::new(path.to_path_buf()))
    }

    async fn read(&self, handle: &ResourceHandle) -> Result<Vec<u8>, ResolveError> {
        tokio::fs::read(handle.path())
            .await
            .map_err(|source| ResolveError::Read {
                path: handle.path().to_path_buf(),
                source,
            })
    }
}

/// Filter and resolve extracted links into uploadable images.
///
/// Remote URLs, unrecognized extensions, and paths no file matches are all
/// skipped silently; skipping is the normal case, not an error.
pub async fn resolve_links(
    matches: &[LinkMatch],
    resolver: &dyn FileResolver,
) -> Vec<ResolvedImage> {
    let mut resolved = Vec::new();

    for link in matches {
        if is_remote(&link.path) {
            continue;
        }
        if !has_image_extension(&link.path) {
            debug!(path = %link.path, "skipping non-image link");
            continue;
        }
        match resolver.resolve(&link.path).await {
            Some(handle) => resolved.push(ResolvedImage {
                handle,
                name: link.name.clone(),
                source: link.source.clone(),
            }),
            None => debug!(path = %link.path, "no local file for link"),
        }
    }

    resolved
}

/// Whether a declared path points at a remote URL instead of a local file.
fn is_remote(path: &str) -> bool {
    let lower = path.to_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Whether a declared path carries one of the recognized image extensions.
fn has_image_extension(path: &str) -> bool {
    match path.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => {
            let ext = ext.to_lowercase();
            IMAGE_EXTENSIONS.contains(&ext.as_str())
        }
        _ => false,
    }
}
