//! # Document Registry
//!
//! The intake and ownership surface over the store seam. The registry
//! runs the validate-then-create upload flow (a truncated or invalid
//! upload never leaves a partial record), answers metadata and listing
//! queries with owner/admin authorization, and releases both the record
//! and its blob on deletion.
//!
//! Status mutation is *not* exposed here — the review engine is the sole
//! path to a transition.

use std::sync::Arc;

use solara_core::{DocumentId, RequesterRole, StorageKey, UserId};

use crate::blob::BlobStore;
use crate::document::{Document, NewDocument};
use crate::error::KycError;
use crate::store::DocumentStore;
use crate::validate::{validate_upload, UploadLimits};

/// Creates, lists, and deletes document records.
pub struct DocumentRegistry {
    store: Arc<dyn DocumentStore>,
    blobs: Arc<dyn BlobStore>,
    limits: UploadLimits,
}

impl DocumentRegistry {
    /// Assemble a registry over explicit collaborators.
    pub fn new(
        store: Arc<dyn DocumentStore>,
        blobs: Arc<dyn BlobStore>,
        limits: UploadLimits,
    ) -> Self {
        Self {
            store,
            blobs,
            limits,
        }
    }

    /// The configured upload ceilings.
    pub fn limits(&self) -> &UploadLimits {
        &self.limits
    }

    /// Validate an upload and admit it to the registry.
    ///
    /// The caller must pass the fully consumed upload body; validation
    /// covers the complete content. Ordering is validate → blob put →
    /// record create, so no failure path leaves a registry record without
    /// its bytes. A create failure after the blob was written releases
    /// the blob again.
    pub async fn ingest(
        &self,
        owner: UserId,
        category: &str,
        declared_mime: &str,
        bytes: Vec<u8>,
    ) -> Result<Document, KycError> {
        let validated = validate_upload(&bytes, declared_mime, category, &self.limits)
            .map_err(|e| KycError::Validation(e.to_string()))?;

        let storage_key = StorageKey::new();
        self.blobs.put(storage_key, bytes).await.map_err(|e| {
            tracing::error!(%storage_key, error = %e, "blob write failed during ingest");
            KycError::Backend("blob write failed".to_string())
        })?;

        let created = self
            .store
            .create(NewDocument {
                owner_id: owner,
                category: validated.category,
                storage_key,
                mime_type: validated.mime_type,
                size_bytes: validated.size_bytes,
                checksum: validated.checksum,
            })
            .await;

        match created {
            Ok(doc) => {
                tracing::info!(
                    document_id = %doc.id,
                    owner = %owner,
                    category = %doc.category,
                    size_bytes = doc.size_bytes,
                    "document admitted to registry"
                );
                Ok(doc)
            }
            Err(e) => {
                // The record never existed; release the orphaned blob.
                if let Err(cleanup) = self.blobs.delete(storage_key).await {
                    tracing::warn!(%storage_key, error = %cleanup, "orphan blob cleanup failed");
                }
                Err(e)
            }
        }
    }

    /// Metadata for one document. Owners see their own records; admins
    /// see any record.
    pub async fn metadata(
        &self,
        id: DocumentId,
        requester: UserId,
        role: RequesterRole,
    ) -> Result<Document, KycError> {
        let doc = self.store.get(id).await?;
        if !doc.is_owned_by(requester) && !role.is_admin() {
            return Err(KycError::Forbidden(format!(
                "{requester} may not view {id}"
            )));
        }
        Ok(doc)
    }

    /// All documents belonging to `owner`, in creation order.
    pub async fn list_for(&self, owner: UserId) -> Result<Vec<Document>, KycError> {
        self.store.list_by_owner(owner).await
    }

    /// Remove a record and request blob deletion. Permitted to the owner
    /// and to admins.
    ///
    /// The registry record is the source of truth, so it is removed
    /// first; a blob-release failure afterwards is an operational fault,
    /// not a caller error.
    pub async fn delete(
        &self,
        id: DocumentId,
        requester: UserId,
        role: RequesterRole,
    ) -> Result<(), KycError> {
        let doc = self.store.get(id).await?;
        if !doc.is_owned_by(requester) && !role.is_admin() {
            return Err(KycError::Forbidden(format!(
                "{requester} may not delete {id}"
            )));
        }

        let removed = self.store.delete(id).await?;
        if let Err(e) = self.blobs.delete(removed.storage_key).await {
            tracing::warn!(
                document_id = %id,
                storage_key = %removed.storage_key,
                error = %e,
                "blob release failed after registry delete"
            );
        }
        tracing::info!(document_id = %id, requester = %requester, "document deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blob::InMemoryBlobStore;
    use crate::category::DocumentCategory;
    use crate::document::DocumentStatus;
    use crate::store::InMemoryDocumentStore;
    use crate::testutil::pdf_bytes;

    fn registry() -> (DocumentRegistry, Arc<InMemoryBlobStore>) {
        let blobs = Arc::new(InMemoryBlobStore::new());
        let registry = DocumentRegistry::new(
            Arc::new(InMemoryDocumentStore::new()),
            blobs.clone(),
            UploadLimits::default(),
        );
        (registry, blobs)
    }

    #[tokio::test]
    async fn test_ingest_creates_pending_document_with_blob() {
        let (registry, blobs) = registry();
        let owner = UserId::new();
        let bytes = pdf_bytes();

        let doc = registry
            .ingest(owner, "national_id", "application/pdf", bytes.clone())
            .await
            .unwrap();

        assert_eq!(doc.status, DocumentStatus::Pending);
        assert_eq!(doc.category, DocumentCategory::NationalId);
        assert_eq!(doc.mime_type, "application/pdf");
        assert_eq!(blobs.get(doc.storage_key).await.unwrap(), bytes);
    }

    #[tokio::test]
    async fn test_ingest_rejects_invalid_upload_without_persisting() {
        let (registry, _) = registry();
        let owner = UserId::new();

        let err = registry
            .ingest(owner, "national_id", "application/pdf", b"not a pdf".to_vec())
            .await
            .unwrap_err();
        assert!(matches!(err, KycError::Validation(_)));
        assert!(registry.list_for(owner).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_metadata_forbidden_for_non_owner() {
        let (registry, _) = registry();
        let owner = UserId::new();
        let doc = registry
            .ingest(owner, "national_id", "application/pdf", pdf_bytes())
            .await
            .unwrap();

        let err = registry
            .metadata(doc.id, UserId::new(), RequesterRole::User)
            .await
            .unwrap_err();
        assert!(matches!(err, KycError::Forbidden(_)));

        // Admin sees it; owner sees it.
        registry
            .metadata(doc.id, UserId::new(), RequesterRole::Admin)
            .await
            .unwrap();
        registry
            .metadata(doc.id, owner, RequesterRole::User)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_delete_releases_blob() {
        let (registry, blobs) = registry();
        let owner = UserId::new();
        let doc = registry
            .ingest(owner, "national_id", "application/pdf", pdf_bytes())
            .await
            .unwrap();

        registry
            .delete(doc.id, owner, RequesterRole::User)
            .await
            .unwrap();
        assert!(blobs.get(doc.storage_key).await.is_err());
        assert!(matches!(
            registry.metadata(doc.id, owner, RequesterRole::User).await,
            Err(KycError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_forbidden_for_stranger_and_missing_is_not_found() {
        let (registry, _) = registry();
        let owner = UserId::new();
        let doc = registry
            .ingest(owner, "national_id", "application/pdf", pdf_bytes())
            .await
            .unwrap();

        let err = registry
            .delete(doc.id, UserId::new(), RequesterRole::User)
            .await
            .unwrap_err();
        assert!(matches!(err, KycError::Forbidden(_)));

        let err = registry
            .delete(DocumentId::new(), owner, RequesterRole::User)
            .await
            .unwrap_err();
        assert!(matches!(err, KycError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_admin_may_delete_another_users_document() {
        let (registry, _) = registry();
        let owner = UserId::new();
        let doc = registry
            .ingest(owner, "national_id", "application/pdf", pdf_bytes())
            .await
            .unwrap();

        registry
            .delete(doc.id, UserId::new(), RequesterRole::Admin)
            .await
            .unwrap();
    }
}
