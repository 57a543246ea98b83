//! Lifecycle error types.

use thiserror::Error;

/// Errors that can occur while managing index generations.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// Corpus enumeration failed (per-file errors are absorbed, this is the
    /// whole-corpus level)
    #[error("Corpus error: {0}")]
    Corpus(#[from] note_corpus::CorpusError),

    /// Analyzer failure mid-build
    #[error("Analysis error: {0}")]
    Analysis(#[from] note_analysis::AnalysisError),

    /// Index engine failure mid-build
    #[error("Index error: {0}")]
    Index(#[from] note_index::IndexError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Build aborted for a non-IO reason (e.g. the build task panicked)
    #[error("Build error: {0}")]
    Build(String),

    /// The freshly built generation failed to open or read back
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Promotion of the staged generation failed; staging is preserved
    #[error("Index swap failed: {0}")]
    Swap(String),

    /// The in-flight rebuild was cancelled by shutdown
    #[error("Rebuild cancelled")]
    Cancelled,

    /// A rebuild is already running; the trigger was dropped
    #[error("A rebuild is already in progress")]
    AlreadyInProgress,

    /// Queries are briefly unavailable while generations are swapped
    #[error("Index is being swapped; retry shortly")]
    SwapInProgress,

    /// No generation has been built yet
    #[error("No active index generation")]
    NoActiveGeneration,
}
