//! # HTTP Routes
//!
//! The two route families of the document service, merged into a single
//! router by [`crate::app`]. Integration tests here exercise the full
//! stack over in-memory collaborators.

pub mod documents;
pub mod kyc;

use axum::Router;

use crate::state::AppState;

/// The complete route table.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(documents::router())
        .merge(kyc::router())
}
