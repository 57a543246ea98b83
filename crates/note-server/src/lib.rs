//! # note-server
//!
//! HTTP surface for note-search.
//!
//! # Endpoints
//!
//! | Method  | Path            | Description                                  |
//! |---------|-----------------|----------------------------------------------|
//! | `GET`   | `/search?q=`    | Ranked search with per-hit snippets          |
//! | `POST`  | `/index`        | Trigger a rebuild (202, or 409 if running)   |
//! | `GET`   | `/index/status` | Build timestamp, doc count, progress         |
//! | `GET`   | `/config`       | Runtime config snapshot                      |
//! | `PATCH` | `/config`       | Merge runtime config (unknown keys ignored)  |
//!
//! Error responses share one JSON envelope:
//!
//! ```json
//! { "error": { "code": "temporarily_unavailable", "message": "..." } }
//! ```
//!
//! CORS allows all origins — the expected caller is an editor plugin served
//! from a different origin.

pub mod routes;
pub mod state;

pub use routes::router;
pub use state::AppState;
