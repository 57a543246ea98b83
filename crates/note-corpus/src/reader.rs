//! Corpus enumeration.
//!
//! Walks the corpus root and yields candidate note files. A file is excluded
//! iff the first component of its corpus-relative path matches an excluded
//! name, so excluded subtrees are pruned at the top level without touching
//! nesting elsewhere. Enumeration order is path-sorted and therefore
//! deterministic within a run, which keeps assigned docnos reproducible.

use std::path::{Path, PathBuf};

use tracing::warn;
use walkdir::WalkDir;

use crate::error::CorpusError;

/// Enumerate the Markdown files of a corpus.
///
/// Returns a lazy iterator over absolute paths in sorted order. Entries the
/// walker cannot read are logged and skipped rather than failing the run;
/// a missing corpus root is an error.
pub fn note_files(
    root: &Path,
    exclude_dirnames: &[String],
) -> Result<impl Iterator<Item = PathBuf>, CorpusError> {
    if !root.is_dir() {
        return Err(CorpusError::RootNotFound(root.to_path_buf()));
    }

    let excluded: Vec<String> = exclude_dirnames.to_vec();

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(move |entry| {
            // Depth 1 is the first path component relative to the root.
            if entry.depth() == 1 {
                let name = entry.file_name().to_string_lossy();
                if excluded.iter().any(|dirname| dirname.as_str() == name) {
                    return false;
                }
            }
            true
        })
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(error = %e, "Skipping unreadable corpus entry");
                None
            }
        })
        .filter(|entry| {
            entry.file_type().is_file()
                && entry.path().extension().is_some_and(|ext| ext == "md")
        })
        .map(|entry| entry.into_path());

    Ok(walker)
}
