//! # Document Store Seam
//!
//! The storage abstraction the registry and review engine operate
//! through. The backing store is the single source of truth for document
//! state and the only place global ordering is enforced: no component
//! caches records across requests.
//!
//! ## Concurrency Contract
//!
//! [`DocumentStore::transition`] is a single conditional operation keyed
//! by the current status — it succeeds only while the record is still
//! `Pending`. Implementations must make this atomic (a mutex over the map
//! in memory, `UPDATE … WHERE status = 'pending'` in Postgres) so racing
//! reviewers are serialized at the store, not in application logic.

mod memory;
mod pg;

pub use memory::InMemoryDocumentStore;
pub use pg::{PgAuditLog, PgDocumentStore};

use async_trait::async_trait;

use solara_core::{DocumentId, Timestamp, UserId};

use crate::document::{Document, DocumentStatus, NewDocument};
use crate::error::KycError;

/// Persistence operations for document records.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Persist a new record with `status = Pending` and an assigned id.
    ///
    /// # Errors
    ///
    /// [`KycError::DuplicateStorageKey`] if the storage key is already
    /// bound — an integrity fault under correct key generation.
    async fn create(&self, new: NewDocument) -> Result<Document, KycError>;

    /// Fetch one record.
    ///
    /// # Errors
    ///
    /// [`KycError::NotFound`] if the id is unknown.
    async fn get(&self, id: DocumentId) -> Result<Document, KycError>;

    /// All records for an owner, in creation order.
    async fn list_by_owner(&self, owner: UserId) -> Result<Vec<Document>, KycError>;

    /// All records awaiting review, in creation order.
    async fn list_pending(&self) -> Result<Vec<Document>, KycError>;

    /// Apply a terminal transition, conditional on the record still being
    /// `Pending`. Sets the reviewer fields and `reviewed_at`/`updated_at`
    /// together.
    ///
    /// # Errors
    ///
    /// - [`KycError::NotFound`] if the id is unknown.
    /// - [`KycError::InvalidTransition`] if the record has already left
    ///   `Pending` (including when this call lost a review race), or if
    ///   `to` is not a terminal status.
    async fn transition(
        &self,
        id: DocumentId,
        to: DocumentStatus,
        reviewer: UserId,
        note: Option<String>,
        at: Timestamp,
    ) -> Result<Document, KycError>;

    /// Remove a record, returning it so the caller can release the blob.
    ///
    /// # Errors
    ///
    /// [`KycError::NotFound`] if the id is unknown.
    async fn delete(&self, id: DocumentId) -> Result<Document, KycError>;
}
