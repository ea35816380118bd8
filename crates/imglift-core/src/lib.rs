//! imglift core library
//!
//! The Link Resolver & Rewriter pipeline for markdown notes: scan note text
//! for image links, resolve them against a vault file inventory, upload each
//! image to a remote host, and rewrite the note to the returned public URLs.
//!
//! The host environment (filesystem, editor, whatever) plugs in through three
//! seams: [`DocumentStore`] for note text, [`FileResolver`] for local files,
//! and [`ImageHost`] for the remote API. [`UploadPipeline`] wires them
//! together.

pub mod document;
pub mod links;
pub mod pipeline;
pub mod resolver;
pub mod rewrite;
pub mod upload;
pub mod vault;

pub use document::{DocumentStore, FsDocumentStore};
pub use links::{extract_image_links, LinkMatch};
pub use pipeline::{
    PipelineError, UploadFailure, UploadPipeline, UploadReport, DEFAULT_MAX_CONCURRENT_UPLOADS,
};
pub use resolver::{
    resolve_links, FileResolver, ResolveError, ResolvedImage, ResourceHandle, VaultResolver,
    IMAGE_EXTENSIONS,
};
pub use rewrite::{apply_replacements, Replacement};
pub use upload::{ImageHost, ImgbbConfig, ImgbbHost, UploadError, DEFAULT_ENDPOINT};
pub use vault::{CaseSensitivity, VaultIndex};
