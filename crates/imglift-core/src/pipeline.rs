//! Upload pipeline
//!
//! Runs the full pass over one note: extract links, resolve them against the
//! vault, upload each image through the configured host with bounded
//! concurrency, then rewrite the note once with every successful replacement.
//!
//! Per-image failures never abort the run; they are collected into the
//! returned [`UploadReport`]. The note is written back at most once, and only
//! if it has not been modified while uploads were in flight.

use futures::stream::{self, StreamExt};
use std::io;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::document::DocumentStore;
use crate::links::extract_image_links;
use crate::resolver::{resolve_links, FileResolver, ResolvedImage};
use crate::rewrite::{apply_replacements, Replacement};
use crate::upload::ImageHost;

/// Default cap on simultaneous uploads.
pub const DEFAULT_MAX_CONCURRENT_UPLOADS: usize = 4;

/// Fatal pipeline errors. Per-image upload failures are not errors; they are
/// reported through [`UploadReport::failures`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Note text could not be read
    #[error("failed to read note: {0}")]
    ReadDocument(#[source] io::Error),

    /// Updated note text could not be written back
    #[error("failed to write note: {0}")]
    WriteDocument(#[source] io::Error),

    /// Another writer changed the note while uploads were in flight
    #[error("note changed while uploads were in flight; rewrite aborted")]
    DocumentChanged,
}

/// One image whose upload did not produce a public URL.
#[derive(Debug, Clone)]
pub struct UploadFailure {
    /// Original link substring, left untouched in the note
    pub source: String,
    /// Display name of the image
    pub name: String,
    /// Human-readable failure description
    pub error: String,
}

/// Outcome of one pipeline run over one note.
#[derive(Debug, Clone, Default)]
pub struct UploadReport {
    /// Resolved local images found in the note
    pub found: usize,
    /// Uploads that succeeded and were rewritten
    pub uploaded: usize,
    /// Uploads that failed; their links are unchanged
    pub failures: Vec<UploadFailure>,
}

impl UploadReport {
    /// Whether the run found nothing to do.
    pub fn is_noop(&self) -> bool {
        self.found == 0
    }
}

/// The Link Resolver & Rewriter pipeline.
pub struct UploadPipeline {
    resolver: Arc<dyn FileResolver>,
    host: Arc<dyn ImageHost>,
    max_concurrent: usize,
}

impl UploadPipeline {
    pub fn new(resolver: Arc<dyn FileResolver>, host: Arc<dyn ImageHost>) -> Self {
        Self {
            resolver,
            host,
            max_concurrent: DEFAULT_MAX_CONCURRENT_UPLOADS,
        }
    }

    /// Cap the number of simultaneous uploads (minimum 1).
    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    /// Extract and resolve without uploading anything. Used for dry runs.
    pub async fn plan(&self, store: &dyn DocumentStore) -> Result<Vec<ResolvedImage>, PipelineError> {
        let text = store.read_text().await.map_err(PipelineError::ReadDocument)?;
        let matches = extract_image_links(&text);
        Ok(resolve_links(&matches, self.resolver.as_ref()).await)
    }

    /// Upload every resolvable image in the note and rewrite its links.
    pub async fn run(&self, store: &dyn DocumentStore) -> Result<UploadReport, PipelineError> {
        let text = store.read_text().await.map_err(PipelineError::ReadDocument)?;
        let matches = extract_image_links(&text);
        let resolved = resolve_links(&matches, self.resolver.as_ref()).await;

        let found = resolved.len();
        if found == 0 {
            info!("no images found");
            return Ok(UploadReport::default());
        }
        info!(count = found, "found images, uploading");

        let outcomes = stream::iter(resolved)
            .map(|image| self.upload_one(image))
            .buffer_unordered(self.max_concurrent)
            .collect::<Vec<_>>()
            .await;

        let mut replacements = Vec::new();
        let mut failures = Vec::new();
        for outcome in outcomes {
            match outcome {
                Ok(replacement) => replacements.push(replacement),
                Err(failure) => {
                    warn!(name = %failure.name, error = %failure.error, "upload failed");
                    failures.push(failure);
                }
            }
        }

        if !replacements.is_empty() {
            // All substitutions run against the snapshot taken at extraction
            // time, and the note is written back exactly once.
            let current = store.read_text().await.map_err(PipelineError::ReadDocument)?;
            if current != text {
                return Err(PipelineError::DocumentChanged);
            }
            let updated = apply_replacements(&text, &replacements);
            store
                .write_text(&updated)
                .await
                .map_err(PipelineError::WriteDocument)?;
        }

        Ok(UploadReport {
            found,
            uploaded: replacements.len(),
            failures,
        })
    }

    async fn upload_one(&self, image: ResolvedImage) -> Result<Replacement, UploadFailure> {
        let bytes = self
            .resolver
            .read(&image.handle)
            .await
            .map_err(|e| UploadFailure {
                source: image.source.clone(),
                name: image.name.clone(),
                error: e.to_string(),
            })?;

        match self.host.upload(&bytes, &image.name).await {
            Ok(url) => Ok(Replacement {
                source: image.source,
                name: image.name,
                url,
            }),
            Err(e) => Err(UploadFailure {
                source: image.source,
                name: image.name,
                error: e.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::{ResolveError, ResourceHandle};
    use crate::upload::UploadError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    struct MemoryStore {
        text: Mutex<String>,
        writes: AtomicUsize,
    }

    impl MemoryStore {
        fn new(text: &str) -> Self {
            Self {
                text: Mutex::new(text.to_string()),
                writes: AtomicUsize::new(0),
            }
        }

        fn text(&self) -> String {
            self.text.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl DocumentStore for MemoryStore {
        async fn read_text(&self) -> io::Result<String> {
            Ok(self.text())
        }

        async fn write_text(&self, text: &str) -> io::Result<()> {
            *self.text.lock().unwrap() = text.to_string();
            self.writes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct MapResolver {
        files: HashMap<String, Vec<u8>>,
    }

    impl MapResolver {
        fn with(files: &[&str]) -> Self {
            Self {
                files: files
                    .iter()
                    .map(|f| (f.to_string(), b"bytes".to_vec()))
                    .collect(),
            }
        }
    }

    #[async_trait]
    impl FileResolver for MapResolver {
        async fn resolve(&self, declared: &str) -> Option<ResourceHandle> {
            self.files
                .contains_key(declared)
                .then(|| ResourceHandle::new(PathBuf::from(declared)))
        }

        async fn read(&self, handle: &ResourceHandle) -> Result<Vec<u8>, ResolveError> {
            Ok(self.files[&handle.path().to_string_lossy().to_string()].clone())
        }
    }

    /// Host that answers `https://host/<name>` after an optional delay, or
    /// rejects everything when `fail` is set.
    struct FakeHost {
        fail: bool,
        delay: Option<Duration>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl FakeHost {
        fn ok() -> Self {
            Self {
                fail: false,
                delay: None,
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self { fail: true, ..Self::ok() }
        }

        fn slow() -> Self {
            Self {
                delay: Some(Duration::from_millis(20)),
                ..Self::ok()
            }
        }
    }

    #[async_trait]
    impl ImageHost for FakeHost {
        async fn upload(&self, _image: &[u8], name: &str) -> Result<String, UploadError> {
            let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(current, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if self.fail {
                Err(UploadError::Rejected)
            } else {
                Ok(format!("https://host/{name}"))
            }
        }
    }

    fn make_pipeline(resolver: MapResolver, host: FakeHost) -> UploadPipeline {
        UploadPipeline::new(Arc::new(resolver), Arc::new(host))
    }

    #[tokio::test]
    async fn test_single_image_round_trip() {
        let store = MemoryStore::new("Hello ![cat](images/cat.png) world");
        let pipeline = make_pipeline(MapResolver::with(&["images/cat.png"]), FakeHost::ok());

        let report = pipeline.run(&store).await.unwrap();

        assert_eq!(report.found, 1);
        assert_eq!(report.uploaded, 1);
        assert!(report.failures.is_empty());
        assert_eq!(store.text(), "Hello ![cat](https://host/cat) world");
    }

    #[tokio::test]
    async fn test_no_images_is_noop() {
        let store = MemoryStore::new("plain text, no links");
        let pipeline = make_pipeline(MapResolver::with(&[]), FakeHost::ok());

        let report = pipeline.run(&store).await.unwrap();

        assert!(report.is_noop());
        assert_eq!(store.writes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_all_uploads_failing_leaves_text_unchanged() {
        let text = "![[a.png]] and ![[b.jpg]]";
        let store = MemoryStore::new(text);
        let pipeline = make_pipeline(MapResolver::with(&["a.png", "b.jpg"]), FakeHost::failing());

        let report = pipeline.run(&store).await.unwrap();

        assert_eq!(report.found, 2);
        assert_eq!(report.uploaded, 0);
        assert_eq!(report.failures.len(), 2);
        assert_eq!(store.text(), text);
        assert_eq!(store.writes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_partial_failure_rewrites_only_successes() {
        let store = MemoryStore::new("![a](a.png) then ![b](missing.png)");
        let pipeline = make_pipeline(MapResolver::with(&["a.png"]), FakeHost::ok());

        let report = pipeline.run(&store).await.unwrap();

        assert_eq!(report.found, 1);
        assert_eq!(report.uploaded, 1);
        assert_eq!(store.text(), "![a](https://host/a) then ![b](missing.png)");
    }

    #[tokio::test]
    async fn test_all_concurrent_completions_land_in_final_text() {
        let text: String = (0..8).map(|i| format!("![n{i}](img{i}.png) ")).collect();
        let files: Vec<String> = (0..8).map(|i| format!("img{i}.png")).collect();
        let file_refs: Vec<&str> = files.iter().map(String::as_str).collect();

        let store = MemoryStore::new(&text);
        let pipeline =
            make_pipeline(MapResolver::with(&file_refs), FakeHost::slow()).with_max_concurrent(8);

        let report = pipeline.run(&store).await.unwrap();

        assert_eq!(report.uploaded, 8);
        let out = store.text();
        for i in 0..8 {
            assert!(out.contains(&format!("![n{i}](https://host/n{i})")), "missing n{i} in {out}");
        }
        // one authoritative write, no stale overwrites possible
        assert_eq!(store.writes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_concurrency_cap_is_respected() {
        let text: String = (0..6).map(|i| format!("![[cap{i}.png]] ")).collect();
        let files: Vec<String> = (0..6).map(|i| format!("cap{i}.png")).collect();
        let file_refs: Vec<&str> = files.iter().map(String::as_str).collect();

        let store = MemoryStore::new(&text);
        let host = Arc::new(FakeHost::slow());
        let host_dyn: Arc<dyn ImageHost> = host.clone();
        let pipeline = UploadPipeline::new(Arc::new(MapResolver::with(&file_refs)), host_dyn)
            .with_max_concurrent(2);

        pipeline.run(&store).await.unwrap();

        assert!(host.max_in_flight.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_external_mutation_aborts_rewrite() {
        struct ShiftingStore {
            reads: AtomicUsize,
        }

        #[async_trait]
        impl DocumentStore for ShiftingStore {
            async fn read_text(&self) -> io::Result<String> {
                let n = self.reads.fetch_add(1, Ordering::SeqCst);
                if n == 0 {
                    Ok("![a](a.png)".to_string())
                } else {
                    Ok("someone else edited this".to_string())
                }
            }

            async fn write_text(&self, _text: &str) -> io::Result<()> {
                panic!("must not write over a mutated note");
            }
        }

        let store = ShiftingStore { reads: AtomicUsize::new(0) };
        let pipeline = make_pipeline(MapResolver::with(&["a.png"]), FakeHost::ok());

        let err = pipeline.run(&store).await.unwrap_err();
        assert!(matches!(err, PipelineError::DocumentChanged));
    }

    #[tokio::test]
    async fn test_plan_lists_resolved_without_uploading() {
        let store = MemoryStore::new("![a](a.png) ![b](gone.png)");
        let pipeline = make_pipeline(MapResolver::with(&["a.png"]), FakeHost::failing());

        let planned = pipeline.plan(&store).await.unwrap();

        assert_eq!(planned.len(), 1);
        assert_eq!(planned[0].name, "a");
        assert_eq!(store.text(), "![a](a.png) ![b](gone.png)");
    }
}
