//! Route handlers and the JSON error envelope.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::error;

use note_lifecycle::{LifecycleStatus, RebuildReason, TriggerOutcome};
use note_query::{QueryError, SearchHit};
use note_types::RuntimeConfigPatch;

use crate::state::AppState;

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/search", get(handle_search))
        .route("/index", post(handle_rebuild))
        .route("/index/status", get(handle_status))
        .route("/config", get(handle_get_config).patch(handle_patch_config))
        .layer(cors)
        .with_state(state)
}

// ============ Error envelope ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

/// Error that renders as the shared JSON envelope.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "bad_request", message)
    }

    fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: ErrorDetail {
                code: self.code.to_string(),
                message: self.message,
            },
        });
        (self.status, body).into_response()
    }
}

impl From<QueryError> for ApiError {
    fn from(e: QueryError) -> Self {
        match e {
            QueryError::EmptyQuery => ApiError::bad_request(e.to_string()),
            QueryError::TemporarilyUnavailable => ApiError::new(
                StatusCode::SERVICE_UNAVAILABLE,
                "temporarily_unavailable",
                e.to_string(),
            ),
            QueryError::NoIndex => ApiError::new(
                StatusCode::SERVICE_UNAVAILABLE,
                "index_not_ready",
                e.to_string(),
            ),
            QueryError::Analysis(_) | QueryError::Index(_) => {
                error!(error = %e, "Search failed");
                ApiError::internal(e.to_string())
            }
        }
    }
}

// ============ /search ============

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub results: Vec<SearchHit>,
}

async fn handle_search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let q = params.q.unwrap_or_default();

    // Searches touch disk for live snippets; keep them off the async workers.
    let service = state.query.clone();
    let results = tokio::task::spawn_blocking(move || service.search(&q))
        .await
        .map_err(|e| ApiError::internal(format!("search task failed: {}", e)))??;

    Ok(Json(SearchResponse { results }))
}

// ============ /index ============

#[derive(Debug, Serialize)]
pub struct TriggerResponse {
    pub message: String,
}

async fn handle_rebuild(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<TriggerResponse>), ApiError> {
    match state.lifecycle.trigger(RebuildReason::Manual) {
        TriggerOutcome::Accepted => Ok((
            StatusCode::ACCEPTED,
            Json(TriggerResponse {
                message: "Index rebuild started".to_string(),
            }),
        )),
        TriggerOutcome::AlreadyInProgress => Err(ApiError::new(
            StatusCode::CONFLICT,
            "already_in_progress",
            "A rebuild is already in progress; the request was dropped",
        )),
    }
}

async fn handle_status(State(state): State<AppState>) -> Json<LifecycleStatus> {
    Json(state.lifecycle.status())
}

// ============ /config ============

async fn handle_get_config(State(state): State<AppState>) -> Json<note_types::RuntimeConfig> {
    Json(state.runtime.read().unwrap().clone())
}

#[derive(Debug, Serialize)]
pub struct PatchResponse {
    pub updated: RuntimeConfigPatch,
}

async fn handle_patch_config(
    State(state): State<AppState>,
    Json(patch): Json<RuntimeConfigPatch>,
) -> Result<Json<PatchResponse>, ApiError> {
    let updated = state
        .runtime
        .write()
        .unwrap()
        .apply(&patch)
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    Ok(Json(PatchResponse { updated }))
}
