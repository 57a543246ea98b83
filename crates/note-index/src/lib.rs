//! # note-index
//!
//! Index engine wrapper for note-search, backed by Tantivy.
//!
//! Text reaching this crate is already analyzed into space-joined token
//! strings, so the registered field tokenizer only splits on whitespace and
//! lowercases. Postings layout and BM25 scoring are Tantivy's business; this
//! crate exposes exactly the operations the lifecycle manager and query
//! service need: build a generation directory, open one, run a ranked
//! search, count documents.

pub mod engine;
pub mod error;
pub mod schema;

pub use engine::{build_index, open_index, IndexHandle, SearchRow};
pub use error::IndexError;
pub use schema::{build_note_schema, NoteSchema, PRETOKENIZED};
