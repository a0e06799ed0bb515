//! In-memory document store.
//!
//! Backs unit tests and the development server. A single mutex over the
//! record map gives the same atomicity for conditional transitions that
//! the Postgres implementation gets from single-row conditional updates.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use solara_core::{DocumentId, StorageKey, Timestamp, UserId};

use crate::document::{Document, DocumentStatus, NewDocument};
use crate::error::KycError;

use super::DocumentStore;

#[derive(Default)]
struct Inner {
    docs: HashMap<DocumentId, Document>,
    // Creation order, since map iteration order is arbitrary.
    order: Vec<DocumentId>,
}

/// A document store held entirely in process memory.
#[derive(Default)]
pub struct InMemoryDocumentStore {
    inner: Mutex<Inner>,
}

impl InMemoryDocumentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Inner>, KycError> {
        self.inner
            .lock()
            .map_err(|_| KycError::Backend("document store lock poisoned".to_string()))
    }

    fn key_in_use(inner: &Inner, key: StorageKey) -> bool {
        inner.docs.values().any(|d| d.storage_key == key)
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn create(&self, new: NewDocument) -> Result<Document, KycError> {
        let mut inner = self.lock()?;
        if Self::key_in_use(&inner, new.storage_key) {
            return Err(KycError::DuplicateStorageKey(new.storage_key));
        }

        let now = Timestamp::now();
        let doc = Document {
            id: DocumentId::new(),
            owner_id: new.owner_id,
            category: new.category,
            storage_key: new.storage_key,
            mime_type: new.mime_type,
            size_bytes: new.size_bytes,
            checksum: new.checksum,
            status: DocumentStatus::Pending,
            reviewer_id: None,
            review_note: None,
            reviewed_at: None,
            created_at: now,
            updated_at: now,
        };
        inner.order.push(doc.id);
        inner.docs.insert(doc.id, doc.clone());
        Ok(doc)
    }

    async fn get(&self, id: DocumentId) -> Result<Document, KycError> {
        let inner = self.lock()?;
        inner
            .docs
            .get(&id)
            .cloned()
            .ok_or_else(|| KycError::NotFound(format!("no document {id}")))
    }

    async fn list_by_owner(&self, owner: UserId) -> Result<Vec<Document>, KycError> {
        let inner = self.lock()?;
        Ok(inner
            .order
            .iter()
            .filter_map(|id| inner.docs.get(id))
            .filter(|d| d.owner_id == owner)
            .cloned()
            .collect())
    }

    async fn list_pending(&self) -> Result<Vec<Document>, KycError> {
        let inner = self.lock()?;
        Ok(inner
            .order
            .iter()
            .filter_map(|id| inner.docs.get(id))
            .filter(|d| d.status == DocumentStatus::Pending)
            .cloned()
            .collect())
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

        let mut inner = self.lock()?;
        let doc = inner
            .docs
            .get_mut(&id)
            .ok_or_else(|| KycError::NotFound(format!("no document {id}")))?;

        // Conditional update: only a pending record may transition. A
        // caller that lost a review race lands here with the winner's
        // terminal status.
        if doc.status != DocumentStatus::Pending {
            return Err(KycError::InvalidTransition {
                document_id: id,
                current: doc.status,
            });
        }

        doc.status = to;
        doc.reviewer_id = Some(reviewer);
        doc.review_note = note;
        doc.reviewed_at = Some(at);
        doc.updated_at = at;
        Ok(doc.clone())
    }

    async fn delete(&self, id: DocumentId) -> Result<Document, KycError> {
        let mut inner = self.lock()?;
        let doc = inner
            .docs
            .remove(&id)
            .ok_or_else(|| KycError::NotFound(format!("no document {id}")))?;
        inner.order.retain(|d| *d != id);
        Ok(doc)
    }
}
