//! # note-query
//!
//! Query execution for note-search.
//!
//! Delegates term analysis to the analyzer and ranked retrieval to the index
//! engine, then derives a display snippet per result row — live from the
//! source file when it is still readable, falling back to the indexed
//! plaintext body otherwise, so a response never fails just because a note
//! moved after indexing.

pub mod error;
pub mod service;
pub mod snippet;

pub use error::QueryError;
pub use service::{QueryService, SearchHit, SEARCH_LIMIT};
pub use snippet::{derive_snippet, fallback_snippet};
