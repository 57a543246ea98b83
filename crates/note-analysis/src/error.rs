//! Analysis error types.

use lindera_core::error::LinderaError;
use thiserror::Error;

/// Errors that can occur during analyzer construction or tokenization.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Morphological analyzer error
    #[error("Tokenizer error: {0}")]
    Lindera(#[from] LinderaError),

    /// IO error (stopword list)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
