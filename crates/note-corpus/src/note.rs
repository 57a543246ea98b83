//! Loading a single note from disk.

use std::path::Path;

use crate::error::CorpusError;
use crate::frontmatter::{flatten_values, split_frontmatter, title_of};

/// A note split into the parts the index pipeline consumes.
#[derive(Debug, Clone)]
pub struct Note {
    /// Corpus-relative path with `/` separators.
    pub link_path: String,
    /// Display title: frontmatter `title`, else the filename stem.
    pub title_raw: String,
    /// Markdown body with the frontmatter block removed, trimmed.
    pub body: String,
    /// Flattened frontmatter values, appended to the searchable text.
    pub frontmatter_text: String,
}

impl Note {
    /// Read and split a note file.
    pub fn load(corpus_root: &Path, path: &Path) -> Result<Self, CorpusError> {
        let relative = path
            .strip_prefix(corpus_root)
            .map_err(|_| CorpusError::OutsideCorpus(path.to_path_buf()))?;

        let raw = std::fs::read_to_string(path)?;
        let (metadata, body) = split_frontmatter(&raw);

        Ok(Self {
            link_path: link_path_of(relative),
            title_raw: title_of(path, &metadata),
            body: body.trim().to_string(),
            frontmatter_text: flatten_values(&metadata),
        })
    }
}

/// Render a relative path with `/` separators regardless of platform.
fn link_path_of(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
