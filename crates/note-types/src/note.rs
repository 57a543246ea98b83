//! The record shape handed to the index engine.

use serde::{Deserialize, Serialize};

/// One indexed note.
///
/// `title`/`body` carry pre-analyzed, space-joined token strings; the `_raw`
/// fields carry the display text stored alongside them. `docno` is assigned
/// from the enumeration order of a single build and is not stable across
/// rebuilds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteRecord {
    /// Ordinal document number, unique within one index generation.
    pub docno: String,
    /// Corpus-relative path with `/` separators, the display/navigation key.
    pub link_path: String,
    /// Analyzed title tokens.
    pub title: String,
    /// Original title text (frontmatter `title`, else the filename stem).
    pub title_raw: String,
    /// Analyzed body tokens (plaintext body plus flattened frontmatter values).
    pub body: String,
    /// Plaintext body, used for display fallbacks.
    pub body_raw: String,
}

impl NoteRecord {
    /// Create a record from its parts.
    pub fn new(
        docno: impl Into<String>,
        link_path: impl Into<String>,
        title: impl Into<String>,
        title_raw: impl Into<String>,
        body: impl Into<String>,
        body_raw: impl Into<String>,
    ) -> Self {
        Self {
            docno: docno.into(),
            link_path: link_path.into(),
            title: title.into(),
            title_raw: title_raw.into(),
            body: body.into(),
            body_raw: body_raw.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record() {
        let record = NoteRecord::new(
            "0",
            "notes/a.md",
            "rust 入門",
            "Rust入門",
            "rust は いい",
            "Rustはいい",
        );
        assert_eq!(record.docno, "0");
        assert_eq!(record.link_path, "notes/a.md");
        assert_eq!(record.title_raw, "Rust入門");
    }

    #[test]
    fn test_record_serialization() {
        let record = NoteRecord::new("1", "b.md", "t", "T", "b", "B");
        let json = serde_json::to_string(&record).unwrap();
        let decoded: NoteRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, decoded);
    }
}
