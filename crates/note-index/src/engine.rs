//! Building, opening, and searching index generations.
//!
//! A generation directory is written once by `build_index` and never
//! modified afterwards; `open_index` hands out a read-only handle. The
//! lifecycle manager is responsible for which directory is the active one.

use std::path::Path;

use tantivy::collector::TopDocs;
use tantivy::query::QueryParser;
use tantivy::schema::Value;
use tantivy::tokenizer::{LowerCaser, TextAnalyzer, WhitespaceTokenizer};
use tantivy::{doc, Index, IndexReader, ReloadPolicy, TantivyDocument};
use tracing::{debug, info};

use note_types::NoteRecord;

use crate::error::IndexError;
use crate::schema::{build_note_schema, NoteSchema, PRETOKENIZED};

/// Memory budget for the index writer during a build (50MB).
const WRITER_MEMORY_BYTES: usize = 50_000_000;

/// One ranked search result row.
#[derive(Debug, Clone)]
pub struct SearchRow {
    /// Original title text.
    pub title_raw: String,
    /// Corpus-relative path.
    pub link_path: String,
    /// Plaintext body as indexed.
    pub body_raw: String,
    /// BM25 relevance score.
    pub score: f32,
}

/// Read-only handle to one fully-built index generation.
pub struct IndexHandle {
    index: Index,
    reader: IndexReader,
    schema: NoteSchema,
}

/// Build a fresh index at `dest` from the given records.
///
/// The destination must not already contain an index; staging directories
/// are cleaned by the caller before a build starts. Returns the number of
/// documents written.
pub fn build_index(records: &[NoteRecord], dest: &Path) -> Result<u64, IndexError> {
    std::fs::create_dir_all(dest)?;

    let schema = build_note_schema();
    let index = Index::create_in_dir(dest, schema.schema().clone())?;
    register_pretokenized(&index);

    let mut writer = index.writer(WRITER_MEMORY_BYTES)?;
    for record in records {
        writer.add_document(doc!(
            schema.docno => record.docno.clone(),
            schema.title => record.title.clone(),
            schema.body => record.body.clone(),
            schema.linkpath => record.link_path.clone(),
            schema.title_raw => record.title_raw.clone(),
            schema.body_raw => record.body_raw.clone(),
        ))?;
    }
    writer.commit()?;

    info!(path = ?dest, documents = records.len(), "Built index generation");
    Ok(records.len() as u64)
}

/// Open an existing generation directory.
///
/// Fails if the directory does not hold a readable index with the expected
/// schema — the lifecycle manager treats that as a validation failure.
pub fn open_index(dest: &Path) -> Result<IndexHandle, IndexError> {
    let index = Index::open_in_dir(dest)?;
    register_pretokenized(&index);
    let schema = NoteSchema::from_schema(index.schema())?;

    // Generations are immutable once written, so the reader never needs to
    // chase commits.
    let reader = index
        .reader_builder()
        .reload_policy(ReloadPolicy::Manual)
        .try_into()?;

    debug!(path = ?dest, "Opened index generation");

    Ok(IndexHandle {
        index,
        reader,
        schema,
    })
}

/// Tokenizers are not persisted with the index, so registration happens at
/// both create and open.
fn register_pretokenized(index: &Index) {
    let analyzer = TextAnalyzer::builder(WhitespaceTokenizer::default())
        .filter(LowerCaser)
        .build();
    index.tokenizers().register(PRETOKENIZED, analyzer);
}

impl IndexHandle {
    /// Run a ranked search over title and body.
    ///
    /// `tokenized_query` is the analyzer's space-joined output. Row order is
    /// the engine's BM25 order and is returned untouched.
    pub fn search(&self, tokenized_query: &str, limit: usize) -> Result<Vec<SearchRow>, IndexError> {
        if tokenized_query.trim().is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let searcher = self.reader.searcher();
        let parser = QueryParser::for_index(&self.index, vec![self.schema.title, self.schema.body]);

        let (query, parse_errors) = parser.parse_query_lenient(tokenized_query);
        if !parse_errors.is_empty() {
            debug!(query = tokenized_query, errors = ?parse_errors, "Lenient query parse");
        }

        let top_docs = searcher.search(&query, &TopDocs::with_limit(limit))?;

        let mut rows = Vec::with_capacity(top_docs.len());
        for (score, doc_address) in top_docs {
            let doc: TantivyDocument = searcher.doc(doc_address)?;

            let stored = |field| {
                doc.get_first(field)
                    .and_then(|v| v.as_str())
                    .unwrap_or("")
                    .to_string()
            };

            rows.push(SearchRow {
                title_raw: stored(self.schema.title_raw),
                link_path: stored(self.schema.linkpath),
                body_raw: stored(self.schema.body_raw),
                score,
            });
        }

        Ok(rows)
    }

    /// Number of documents in this generation.
    pub fn document_count(&self) -> u64 {
        self.reader.searcher().num_docs()
    }

    /// The schema this generation was built with.
    pub fn schema(&self) -> &NoteSchema {
        &self.schema
    }
}
