//! # note-analysis
//!
//! Tokenization/normalization front-end for note-search.
//!
//! Wraps a lindera morphological analyzer (embedded IPADIC dictionary)
//! behind a single `analyze` operation that turns free text into a
//! space-joined token string. The same analyzer instance is used for index
//! building and query analysis, so both sides always agree on segmentation.

pub mod analyzer;
pub mod error;

pub use analyzer::JapaneseAnalyzer;
pub use error::AnalysisError;
