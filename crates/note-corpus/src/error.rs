//! Corpus error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading the note corpus.
#[derive(Debug, Error)]
pub enum CorpusError {
    /// The corpus root does not exist or is not a directory
    #[error("Corpus root is not a directory: {}", .0.display())]
    RootNotFound(PathBuf),

    /// A note path does not live under the corpus root
    #[error("Note path is outside the corpus root: {}", .0.display())]
    OutsideCorpus(PathBuf),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
