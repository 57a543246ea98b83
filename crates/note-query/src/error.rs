//! Query error types.

use thiserror::Error;

/// Errors that can occur while serving a search request.
#[derive(Debug, Error)]
pub enum QueryError {
    /// The query string is missing or blank
    #[error("Query must not be empty")]
    EmptyQuery,

    /// Generations are being swapped; the caller should retry shortly
    #[error("Index is being swapped; retry shortly")]
    TemporarilyUnavailable,

    /// No generation has been built yet
    #[error("No index generation is available yet")]
    NoIndex,

    /// Query analysis failed
    #[error("Analysis error: {0}")]
    Analysis(#[from] note_analysis::AnalysisError),

    /// Retrieval failed
    #[error("Index error: {0}")]
    Index(#[from] note_index::IndexError),
}
