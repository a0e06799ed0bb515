//! # Document Routes
//!
//! Routes:
//! - `POST   /documents/upload` — multipart intake (authenticated)
//! - `GET    /documents` — caller's documents (authenticated)
//! - `GET    /documents/{id}` — metadata (owner or admin)
//! - `GET    /documents/{id}/download` — byte stream (owner; admin audited)
//! - `DELETE /documents/{id}` — owner or admin
//! - `GET    /documents/categories/list` — public category enumeration
//! - `GET    /documents/admin/proxy/{id}` — admin inline fetch, audited
//! - `GET    /documents/admin/download/{id}` — admin download, audited
//! - `GET    /documents/health/status` — liveness
//!
//! Handlers carry no business logic — they translate HTTP to the
//! registry/mediator operations and map domain errors to responses.

use axum::body::Body;
use axum::extract::{Multipart, Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use solara_core::{DocumentId, Timestamp, UserId};
use solara_kyc::category::ALL_CATEGORIES;
use solara_kyc::{AccessAction, Document, DocumentCategory, DocumentContent, DocumentStatus};

use crate::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Wire representation of a document record. The storage key stays
/// internal — callers address documents by id only.
#[derive(Debug, Serialize, Deserialize)]
pub struct DocumentView {
    pub id: DocumentId,
    pub owner_id: UserId,
    pub category: DocumentCategory,
    pub status: DocumentStatus,
    pub mime_type: String,
    pub size_bytes: u64,
    pub checksum: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewer_id: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<Document> for DocumentView {
    fn from(doc: Document) -> Self {
        Self {
            id: doc.id,
            owner_id: doc.owner_id,
            category: doc.category,
            status: doc.status,
            mime_type: doc.mime_type,
            size_bytes: doc.size_bytes,
            checksum: doc.checksum.to_string(),
            reviewer_id: doc.reviewer_id,
            review_note: doc.review_note,
            reviewed_at: doc.reviewed_at,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        }
    }
}

/// One entry of the public category listing.
#[derive(Debug, Serialize)]
struct CategoryView {
    id: &'static str,
    label: &'static str,
    allowed_mime_types: &'static [&'static str],
}

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/documents", get(list_documents))
        .route("/documents/upload", axum::routing::post(upload))
        .route("/documents/categories/list", get(list_categories))
        .route("/documents/health/status", get(health))
        .route(
            "/documents/{id}",
            get(metadata).delete(delete_document),
        )
        .route("/documents/{id}/download", get(download))
        .route("/documents/admin/proxy/{id}", get(admin_proxy))
        .route("/documents/admin/download/{id}", get(admin_download))
}

async fn upload(
    State(state): State<AppState>,
    auth: AuthUser,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<DocumentView>), AppError> {
    let mut category: Option<String> = None;
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("malformed multipart body: {e}")))?
    {
        match field.name() {
            Some("category") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("unreadable category field: {e}")))?;
                category = Some(text);
            }
            Some("file") => {
                let declared_mime = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                // Consumes the entire stream; a truncated body fails here,
                // before any record exists.
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("unreadable file field: {e}")))?;
                file = Some((declared_mime, bytes.to_vec()));
            }
            _ => {}
        }
    }

    let category =
        category.ok_or_else(|| AppError::Validation("missing category field".to_string()))?;
    let (declared_mime, bytes) =
        file.ok_or_else(|| AppError::Validation("missing file field".to_string()))?;

    let doc = state
        .registry
        .ingest(auth.user_id, &category, &declared_mime, bytes)
        .await?;
    Ok((StatusCode::CREATED, Json(doc.into())))
}

async fn list_documents(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<DocumentView>>, AppError> {
    let docs = state.registry.list_for(auth.user_id).await?;
    Ok(Json(docs.into_iter().map(DocumentView::from).collect()))
}

async fn metadata(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DocumentId>,
) -> Result<Json<DocumentView>, AppError> {
    let doc = state
        .registry
        .metadata(id, auth.user_id, auth.role)
        .await?;
    Ok(Json(doc.into()))
}

async fn delete_document(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DocumentId>,
) -> Result<StatusCode, AppError> {
    state.registry.delete(id, auth.user_id, auth.role).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn download(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DocumentId>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let content = state
        .mediator
        .authorize_and_fetch(
            id,
            auth.user_id,
            auth.role,
            AccessAction::Download,
            range_header(&headers),
        )
        .await?;
    Ok(content_response(content, Some(attachment_name(id))))
}

async fn admin_proxy(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DocumentId>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    auth.require_admin()?;
    let content = state
        .mediator
        .authorize_and_fetch(
            id,
            auth.user_id,
            auth.role,
            AccessAction::Proxy,
            range_header(&headers),
        )
        .await?;
    Ok(content_response(content, None))
}

async fn admin_download(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DocumentId>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    auth.require_admin()?;
    let content = state
        .mediator
        .authorize_and_fetch(
            id,
            auth.user_id,
            auth.role,
            AccessAction::Download,
            range_header(&headers),
        )
        .await?;
    Ok(content_response(content, Some(attachment_name(id))))
}

async fn list_categories() -> Json<Vec<CategoryView>> {
    Json(
        ALL_CATEGORIES
            .iter()
            .map(|cat| CategoryView {
                id: cat.as_str(),
                label: cat.label(),
                allowed_mime_types: cat.allowed_mime_types(),
            })
            .collect(),
    )
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

fn range_header(headers: &HeaderMap) -> Option<&str> {
    headers.get(header::RANGE).and_then(|v| v.to_str().ok())
}

/// Build the byte response: 206 with `Content-Range` when a range was
/// served, 200 otherwise.
fn content_response(content: DocumentContent, disposition: Option<String>) -> Response {
    let status = if content.range.is_some() {
        StatusCode::PARTIAL_CONTENT
    } else {
        StatusCode::OK
    };

    let mut builder = Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, content.mime_type.as_str())
        .header(header::CONTENT_LENGTH, content.bytes.len());
    if let Some((start, end)) = content.range {
        builder = builder.header(
            header::CONTENT_RANGE,
            format!("bytes {start}-{end}/{}", content.total_size),
        );
    }
    if let Some(disposition) = disposition {
        builder = builder.header(header::CONTENT_DISPOSITION, disposition);
    }

    builder
        .body(Body::from(content.bytes))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

fn attachment_name(id: DocumentId) -> String {
    format!("attachment; filename=\"{}\"", id.as_uuid())
}
