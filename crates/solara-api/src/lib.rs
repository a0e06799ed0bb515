//! # solara-api — HTTP Surface for the Document Service
//!
//! Axum application serving the document and KYC routes. The gateway in
//! front of this service terminates sessions and injects identity headers
//! (see [`auth`]); this crate trusts those headers and enforces
//! resource-level authorization only.
//!
//! ## Design
//!
//! - Handlers are thin: parse, delegate to `solara-kyc`, serialize.
//! - All failures flow through [`error::AppError`], which owns the
//!   status-code mapping and the JSON error envelope.
//! - State is assembled once at startup from explicit collaborators
//!   ([`state::AppState::assemble`]); tests swap in the in-memory graph.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use config::AppConfig;
pub use error::AppError;
pub use state::AppState;

/// Multipart framing overhead allowed on top of the document ceiling.
const BODY_LIMIT_SLACK: usize = 64 * 1024;

/// Build the application router over the given state.
pub fn app(state: AppState) -> Router {
    let body_limit = state.max_upload_bytes as usize + BODY_LIMIT_SLACK;
    routes::router()
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
