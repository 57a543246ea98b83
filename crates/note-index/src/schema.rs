//! Tantivy schema for note documents.
//!
//! Searchable fields hold pre-analyzed token strings; the raw display fields
//! are stored but not indexed.

use tantivy::schema::{
    Field, IndexRecordOption, Schema, TextFieldIndexing, TextOptions, STORED, STRING,
};

use crate::error::IndexError;

/// Name of the registered whitespace+lowercase analyzer for pre-analyzed text.
pub const PRETOKENIZED: &str = "pretokenized";

/// Schema field handles for efficient access.
#[derive(Debug, Clone)]
pub struct NoteSchema {
    schema: Schema,
    /// Ordinal document number (STRING | STORED)
    pub docno: Field,
    /// Analyzed title tokens (TEXT, pretokenized)
    pub title: Field,
    /// Analyzed body tokens (TEXT, pretokenized)
    pub body: Field,
    /// Corpus-relative path (STRING | STORED)
    pub linkpath: Field,
    /// Original title text (STORED)
    pub title_raw: Field,
    /// Plaintext body (STORED)
    pub body_raw: Field,
}

impl NoteSchema {
    /// Get the underlying Tantivy schema.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Recover field handles from an existing Tantivy schema.
    pub fn from_schema(schema: Schema) -> Result<Self, IndexError> {
        let field = |name: &str| {
            schema
                .get_field(name)
                .map_err(|_| IndexError::SchemaMismatch(format!("missing {} field", name)))
        };

        Ok(Self {
            docno: field("docno")?,
            title: field("title")?,
            body: field("body")?,
            linkpath: field("linkpath")?,
            title_raw: field("title_raw")?,
            body_raw: field("body_raw")?,
            schema,
        })
    }
}

/// Build the note schema.
pub fn build_note_schema() -> NoteSchema {
    let mut builder = Schema::builder();

    let indexing = TextFieldIndexing::default()
        .set_tokenizer(PRETOKENIZED)
        .set_index_option(IndexRecordOption::WithFreqsAndPositions);
    let searchable = TextOptions::default().set_indexing_options(indexing);

    let docno = builder.add_text_field("docno", STRING | STORED);
    let title = builder.add_text_field("title", searchable.clone());
    let body = builder.add_text_field("body", searchable);
    let linkpath = builder.add_text_field("linkpath", STRING | STORED);
    let title_raw = builder.add_text_field("title_raw", STORED);
    let body_raw = builder.add_text_field("body_raw", STORED);

    let schema = builder.build();

    NoteSchema {
        schema,
        docno,
        title,
        body,
        linkpath,
        title_raw,
        body_raw,
    }
}
