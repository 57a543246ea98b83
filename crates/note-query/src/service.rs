//! The query service.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use note_analysis::JapaneseAnalyzer;
use note_corpus::{split_frontmatter, to_plaintext};
use note_index::SearchRow;
use note_lifecycle::{LifecycleError, LifecycleManager};

use crate::error::QueryError;
use crate::snippet::{derive_snippet, fallback_snippet};

/// Maximum result rows per search.
pub const SEARCH_LIMIT: usize = 20;

/// One search result as returned to clients.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub title: String,
    pub linkpath: String,
    pub snippet: String,
}

/// Executes searches against the active generation.
///
/// Result ordering is whatever the index engine returns; nothing is
/// re-ranked here.
pub struct QueryService {
    corpus_root: PathBuf,
    analyzer: Arc<JapaneseAnalyzer>,
    lifecycle: LifecycleManager,
}

impl QueryService {
    pub fn new(
        corpus_root: impl Into<PathBuf>,
        analyzer: Arc<JapaneseAnalyzer>,
        lifecycle: LifecycleManager,
    ) -> Self {
        Self {
            corpus_root: corpus_root.into(),
            analyzer,
            lifecycle,
        }
    }

    /// Run a search and derive a snippet for each hit.
    ///
    /// Rejected with a retryable error only while a generation swap is in
    /// flight; every other lifecycle state serves against the snapshot taken
    /// at the top of the request.
    pub fn search(&self, query: &str) -> Result<Vec<SearchHit>, QueryError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(QueryError::EmptyQuery);
        }

        let generation = self.lifecycle.snapshot().map_err(|e| match e {
            LifecycleError::SwapInProgress => QueryError::TemporarilyUnavailable,
            _ => QueryError::NoIndex,
        })?;

        let tokenized = self.analyzer.analyze(query)?;
        let snippet_width = self.lifecycle.runtime().read().unwrap().snippet_width;

        let rows = generation.handle.search(&tokenized, SEARCH_LIMIT)?;

        let hits: Vec<SearchHit> = rows
            .into_iter()
            .map(|row| {
                let snippet = self.snippet_for(&row, query, snippet_width);
                SearchHit {
                    title: row.title_raw,
                    linkpath: row.link_path,
                    snippet,
                }
            })
            .collect();

        info!(query, results = hits.len(), "Search complete");
        Ok(hits)
    }

    /// Live snippet from the source file, falling back to the indexed body.
    ///
    /// The live path re-derives plaintext with the same function the build
    /// used, so the snippet matches what was indexed. A note deleted or
    /// moved since the last rebuild degrades to the stored body instead of
    /// failing the response.
    fn snippet_for(&self, row: &SearchRow, query: &str, width: usize) -> String {
        let path = self.corpus_root.join(&row.link_path);

        match std::fs::read_to_string(&path) {
            Ok(raw) if !raw.trim().is_empty() => {
                let (_, body) = split_frontmatter(&raw);
                let plaintext = to_plaintext(body);
                if plaintext.is_empty() {
                    fallback_snippet(&row.body_raw, width)
                } else {
                    derive_snippet(&plaintext, query, width)
                }
            }
            _ => {
                debug!(path = ?path, "Live snippet unavailable; using indexed body");
                fallback_snippet(&row.body_raw, width)
            }
        }
    }
}
