//! Index error types.

use thiserror::Error;

/// Errors that can occur while building, opening, or searching an index.
#[derive(Debug, Error)]
pub enum IndexError {
    /// Tantivy index error
    #[error("Tantivy error: {0}")]
    Tantivy(#[from] tantivy::TantivyError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The on-disk schema does not match this crate's schema
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),
}
