//! Postgres-backed document store and audit log.
//!
//! One `documents` table, indexed by owner and by status. The transition
//! path is a single conditional `UPDATE … WHERE status = 'pending'`, so
//! two racing reviewers are serialized by the database row lock — the
//! loser's update matches zero rows and is reported as an invalid
//! transition against the now-current status.
//!
//! Listings are ordered by the `seq` insertion sequence, never by
//! `created_at`: timestamps are truncated to whole seconds, so two
//! uploads in the same second tie on `created_at`, and the aggregate's
//! latest-per-category rule needs a total creation order.
//!
//! Expected schema:
//!
//! ```sql
//! CREATE TABLE documents (
//!     id           UUID PRIMARY KEY,
//!     seq          BIGSERIAL NOT NULL UNIQUE,
//!     owner_id     UUID NOT NULL,
//!     category     TEXT NOT NULL,
//!     storage_key  UUID NOT NULL UNIQUE,
//!     mime_type    TEXT NOT NULL,
//!     size_bytes   BIGINT NOT NULL,
//!     checksum     TEXT NOT NULL,
//!     status       TEXT NOT NULL DEFAULT 'pending',
//!     reviewer_id  UUID,
//!     review_note  TEXT,
//!     reviewed_at  TIMESTAMPTZ,
//!     created_at   TIMESTAMPTZ NOT NULL,
//!     updated_at   TIMESTAMPTZ NOT NULL
//! );
//! CREATE INDEX documents_owner_idx ON documents (owner_id, seq);
//! CREATE INDEX documents_status_idx ON documents (status, seq);
//!
//! CREATE TABLE document_audit (
//!     id           BIGSERIAL PRIMARY KEY,
//!     requester_id UUID NOT NULL,
//!     document_id  UUID NOT NULL,
//!     action       TEXT NOT NULL,
//!     occurred_at  TIMESTAMPTZ NOT NULL
//! );
//! CREATE INDEX document_audit_doc_idx ON document_audit (document_id, id);
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use solara_core::{ContentDigest, DocumentId, StorageKey, Timestamp, UserId};

use crate::audit::{AuditAction, AuditEntry, AuditSink};
use crate::category::DocumentCategory;
use crate::document::{Document, DocumentStatus, NewDocument};
use crate::error::KycError;

use super::DocumentStore;

const DOCUMENT_COLUMNS: &str = "id, owner_id, category, storage_key, mime_type, size_bytes, \
     checksum, status, reviewer_id, review_note, reviewed_at, created_at, updated_at";

/// SQL for a listing over `documents`, ordered by the `seq` insertion
/// sequence. `created_at` is second-truncated and ties under load.
fn listing_sql(filter: &str) -> String {
    format!("SELECT {DOCUMENT_COLUMNS} FROM documents WHERE {filter} ORDER BY seq")
}

/// A document store backed by a Postgres pool.
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    /// Wrap an existing connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct DocumentRow {
    id: Uuid,
    owner_id: Uuid,
    category: String,
    storage_key: Uuid,
    mime_type: String,
    size_bytes: i64,
    checksum: String,
    status: String,
    reviewer_id: Option<Uuid>,
    review_note: Option<String>,
    reviewed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<DocumentRow> for Document {
    type Error = KycError;

    fn try_from(row: DocumentRow) -> Result<Self, Self::Error> {
        let category = DocumentCategory::parse(&row.category)
            .ok_or_else(|| KycError::Backend(format!("unknown stored category {:?}", row.category)))?;
        let status = DocumentStatus::parse(&row.status)
            .ok_or_else(|| KycError::Backend(format!("unknown stored status {:?}", row.status)))?;
        let checksum = ContentDigest::parse(&row.checksum)
            .ok_or_else(|| KycError::Backend("malformed stored checksum".to_string()))?;

        Ok(Document {
            id: DocumentId(row.id),
            owner_id: UserId(row.owner_id),
            category,
            storage_key: StorageKey(row.storage_key),
            mime_type: row.mime_type,
            size_bytes: row.size_bytes as u64,
            checksum,
            status,
            reviewer_id: row.reviewer_id.map(UserId),
            review_note: row.review_note,
            reviewed_at: row.reviewed_at.map(Timestamp::from_utc),
            created_at: Timestamp::from_utc(row.created_at),
            updated_at: Timestamp::from_utc(row.updated_at),
        })
    }
}

fn backend(e: sqlx::Error) -> KycError {
    KycError::Backend(e.to_string())
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn create(&self, new: NewDocument) -> Result<Document, KycError> {
        let id = DocumentId::new();
        let now = Timestamp::now();
        let sql = format!(
            "INSERT INTO documents ({DOCUMENT_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, 'pending', NULL, NULL, NULL, $8, $8) \
             RETURNING {DOCUMENT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, DocumentRow>(&sql)
            .bind(id.0)
            .bind(new.owner_id.0)
            .bind(new.category.as_str())
            .bind(new.storage_key.0)
            .bind(&new.mime_type)
            .bind(new.size_bytes as i64)
            .bind(new.checksum.to_string())
            .bind(*now.as_datetime())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    KycError::DuplicateStorageKey(new.storage_key)
                }
                _ => backend(e),
            })?;
        row.try_into()
    }

    async fn get(&self, id: DocumentId) -> Result<Document, KycError> {
        let sql = format!("SELECT {DOCUMENT_COLUMNS} FROM documents WHERE id = $1");
        let row = sqlx::query_as::<_, DocumentRow>(&sql)
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?
            .ok_or_else(|| KycError::NotFound(format!("no document {id}")))?;
        row.try_into()
    }

    async fn list_by_owner(&self, owner: UserId) -> Result<Vec<Document>, KycError> {
        let rows = sqlx::query_as::<_, DocumentRow>(&listing_sql("owner_id = $1"))
            .bind(owner.0)
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;
        rows.into_iter().map(Document::try_from).collect()
    }

    async fn list_pending(&self) -> Result<Vec<Document>, KycError> {
        let rows = sqlx::query_as::<_, DocumentRow>(&listing_sql("status = 'pending'"))
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;
        rows.into_iter().map(Document::try_from).collect()
    }

    async fn transition(
        &self,
        id: DocumentId,
        to: DocumentStatus,
        reviewer: UserId,
        note: Option<String>,
        at: Timestamp,
    ) -> Result<Document, KycError> {
        if !to.is_terminal() {
            return Err(KycError::InvalidTransition {
                document_id: id,
                current: DocumentStatus::Pending,
            });
        }

        let sql = format!(
            "UPDATE documents \
             SET status = $2, reviewer_id = $3, review_note = $4, reviewed_at = $5, updated_at = $5 \
             WHERE id = $1 AND status = 'pending' \
             RETURNING {DOCUMENT_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, DocumentRow>(&sql)
            .bind(id.0)
            .bind(to.as_str())
            .bind(reviewer.0)
            .bind(&note)
            .bind(*at.as_datetime())
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;

        match updated {
            Some(row) => row.try_into(),
            // Zero rows: either the document is gone or it already left
            // pending. Re-fetch to report which.
            None => {
                let current = self.get(id).await?;
                Err(KycError::InvalidTransition {
                    document_id: id,
                    current: current.status,
                })
            }
        }
    }

    async fn delete(&self, id: DocumentId) -> Result<Document, KycError> {
        let sql = format!("DELETE FROM documents WHERE id = $1 RETURNING {DOCUMENT_COLUMNS}");
        let row = sqlx::query_as::<_, DocumentRow>(&sql)
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?
            .ok_or_else(|| KycError::NotFound(format!("no document {id}")))?;
        row.try_into()
    }
}

/// An append-only audit log backed by the same Postgres database.
#[derive(Clone)]
pub struct PgAuditLog {
    pool: PgPool,
}

impl PgAuditLog {
    /// Wrap an existing connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct AuditRow {
    requester_id: Uuid,
    document_id: Uuid,
    action: String,
    occurred_at: DateTime<Utc>,
}

impl TryFrom<AuditRow> for AuditEntry {
    type Error = KycError;

    fn try_from(row: AuditRow) -> Result<Self, Self::Error> {
        let action = AuditAction::parse(&row.action)
            .ok_or_else(|| KycError::Backend(format!("unknown audit action {:?}", row.action)))?;
        Ok(AuditEntry {
            requester_id: UserId(row.requester_id),
            document_id: DocumentId(row.document_id),
            action,
            occurred_at: Timestamp::from_utc(row.occurred_at),
        })
    }
}

#[async_trait]
impl AuditSink for PgAuditLog {
    async fn record(&self, entry: AuditEntry) -> Result<(), KycError> {
        sqlx::query(
            "INSERT INTO document_audit (requester_id, document_id, action, occurred_at) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(entry.requester_id.0)
        .bind(entry.document_id.0)
        .bind(entry.action.as_str())
        .bind(*entry.occurred_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(backend)?;
        Ok(())
    }

    async fn entries_for(&self, document: DocumentId) -> Result<Vec<AuditEntry>, KycError> {
        let rows = sqlx::query_as::<_, AuditRow>(
            "SELECT requester_id, document_id, action, occurred_at \
             FROM document_audit WHERE document_id = $1 ORDER BY id",
        )
        .bind(document.0)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;
        rows.into_iter().map(AuditEntry::try_from).collect()
    }
}
