//! Shared application state for route handlers.

use std::sync::Arc;

use note_lifecycle::LifecycleManager;
use note_query::QueryService;
use note_types::SharedRuntimeConfig;

/// State injected into every handler.
#[derive(Clone)]
pub struct AppState {
    /// Query execution (analysis, retrieval, snippets).
    pub query: Arc<QueryService>,
    /// Rebuild triggers and status.
    pub lifecycle: LifecycleManager,
    /// Live-mutable knobs behind `/config`.
    pub runtime: SharedRuntimeConfig,
}
