//! # KYC Routes
//!
//! Routes:
//! - `GET  /kyc/status` — caller's derived verification aggregate
//! - `GET  /kyc/requirements` — required/missing categories for the profile
//! - `POST /kyc/submit` — completeness gate before review
//! - `GET  /kyc/admin/pending` — global review queue (admin)
//! - `POST /kyc/admin/approve` — approve a pending document (admin)
//! - `POST /kyc/admin/reject` — reject with a mandatory note (admin)

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use solara_core::DocumentId;
use solara_kyc::{DocumentCategory, KycStatus, ProfileType};

use crate::auth::AuthUser;
use crate::error::AppError;
use crate::routes::documents::DocumentView;
use crate::state::AppState;

/// The caller's derived verification state.
#[derive(Debug, Serialize, Deserialize)]
pub struct KycStatusResponse {
    pub status: KycStatus,
    pub profile: ProfileType,
}

/// Requirement listing for the caller's profile.
#[derive(Debug, Serialize)]
pub struct RequirementsResponse {
    pub profile: ProfileType,
    pub required: Vec<DocumentCategory>,
    pub missing: Vec<DocumentCategory>,
}

/// Body of the admin approve/reject calls.
#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    #[serde(alias = "documentId")]
    pub document_id: DocumentId,
    #[serde(default)]
    pub note: Option<String>,
}

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/kyc/status", get(status))
        .route("/kyc/requirements", get(requirements))
        .route("/kyc/submit", post(submit))
        .route("/kyc/admin/pending", get(pending))
        .route("/kyc/admin/approve", post(approve))
        .route("/kyc/admin/reject", post(reject))
}

async fn status(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<KycStatusResponse>, AppError> {
    let status = state.review.kyc_status(auth.user_id, auth.profile).await?;
    Ok(Json(KycStatusResponse {
        status,
        profile: auth.profile,
    }))
}

async fn requirements(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<RequirementsResponse>, AppError> {
    let missing = state
        .review
        .missing_categories(auth.user_id, auth.profile)
        .await?;
    Ok(Json(RequirementsResponse {
        profile: auth.profile,
        required: auth.profile.required_categories().to_vec(),
        missing,
    }))
}

/// Completeness gate: a submission with required categories still missing
/// is rejected up front, naming each gap. A complete submission reports
/// the aggregate the reviewers will see.
async fn submit(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<KycStatusResponse>, AppError> {
    let missing = state
        .review
        .missing_categories(auth.user_id, auth.profile)
        .await?;
    if !missing.is_empty() {
        let names: Vec<&str> = missing.iter().map(DocumentCategory::as_str).collect();
        return Err(AppError::Validation(format!(
            "missing required documents: {}",
            names.join(", ")
        )));
    }
    let status = state.review.kyc_status(auth.user_id, auth.profile).await?;
    Ok(Json(KycStatusResponse {
        status,
        profile: auth.profile,
    }))
}

async fn pending(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<DocumentView>>, AppError> {
    auth.require_admin()?;
    let docs = state.review.pending_queue().await?;
    Ok(Json(docs.into_iter().map(DocumentView::from).collect()))
}

async fn approve(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<ReviewRequest>,
) -> Result<Json<DocumentView>, AppError> {
    auth.require_admin()?;
    let doc = state
        .review
        .approve(req.document_id, auth.user_id, req.note)
        .await?;
    Ok(Json(doc.into()))
}

async fn reject(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<ReviewRequest>,
) -> Result<Json<DocumentView>, AppError> {
    auth.require_admin()?;
    let note = req.note.unwrap_or_default();
    let doc = state
        .review
        .reject(req.document_id, auth.user_id, note)
        .await?;
    Ok(Json(doc.into()))
}
