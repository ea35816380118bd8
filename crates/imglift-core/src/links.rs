//! Image link extraction
//!
//! Scans raw note text for the two image link syntaxes:
//! - Markdown-style: `![name](path)`
//! - Embed-style: `![[path]]` (the display name is the path's file stem)
//!
//! Extraction is pure text processing: no filesystem access, no filtering.
//! Deciding whether a match is actually uploadable is the resolver's job.

use regex::Regex;
use std::sync::LazyLock;

static MARKDOWN_IMAGE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[([^\[\]]*)\]\(([^()]*)\)").expect("markdown image regex"));

static EMBED_IMAGE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[\[([^\]]+)\]\]").expect("embed image regex"));

/// One parsed occurrence of an image link in note text.
///
/// `source` is the exact matched substring and serves as the replacement key
/// when the note is rewritten. The declared `path` keeps its original case;
/// case folding is a lookup policy, not an extraction concern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkMatch {
    /// Display name for the image
    pub name: String,
    /// Path string as authored inside the link
    pub path: String,
    /// Exact original substring of the note text
    pub source: String,
}

/// Extract every image link occurrence from note text.
///
/// Markdown-style matches are collected first, then embed-style matches, each
/// group in document order. Running this twice on the same text yields the
/// same sequence.
pub fn extract_image_links(text: &str) -> Vec<LinkMatch> {
    let mut links = Vec::new();

    for cap in MARKDOWN_IMAGE_REGEX.captures_iter(text) {
        let full = cap.get(0).expect("match group 0");
        links.push(LinkMatch {
            name: cap[1].to_string(),
            path: cap[2].to_string(),
            source: full.as_str().to_string(),
        });
    }

    for cap in EMBED_IMAGE_REGEX.captures_iter(text) {
        let full = cap.get(0).expect("match group 0");
        let path = &cap[1];
        links.push(LinkMatch {
            name: file_stem(path).to_string(),
            path: path.to_string(),
            source: full.as_str().to_string(),
        });
    }

    links
}

/// File stem of a declared path: directory components and the final
/// extension stripped, e.g. `images/cat.png` -> `cat`.
fn file_stem(path: &str) -> &str {
    let base = path
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(path);
    match base.rfind('.') {
        Some(0) | None => base,
        Some(idx) => &base[..idx],
    }
}
