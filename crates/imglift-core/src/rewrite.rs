//! Link rewriting
//!
//! Successful uploads are applied as one bulk pass against a single snapshot
//! of the note text: every replacement swaps the first occurrence of its
//! original link substring for a markdown link to the public URL. Doing all
//! substitutions against one snapshot (instead of writing the note once per
//! completed upload) means late-finishing uploads can never clobber earlier
//! rewrites.

/// One pending link substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    /// Exact original link substring to replace
    pub source: String,
    /// Display name carried into the new link
    pub name: String,
    /// Public URL returned by the image host
    pub url: String,
}

impl Replacement {
    /// The markdown link that replaces the original substring.
    pub fn rendered(&self) -> String {
        format!("![{}]({})", self.name, self.url)
    }
}

/// Apply all replacements against one snapshot of the note text.
///
/// Each replacement substitutes only the first occurrence of its `source`,
/// so a note containing the same link twice keeps its second occurrence
/// unless a second replacement covers it.
pub fn apply_replacements(text: &str, replacements: &[Replacement]) -> String {
    let mut output = text.to_string();
    for replacement in replacements {
        output = output.replacen(&replacement.source, &replacement.rendered(), 1);
    }
    output
}
