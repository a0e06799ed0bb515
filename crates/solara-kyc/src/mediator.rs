//! # Access Mediator
//!
//! The read-path gate in front of the blob store. Decides, per request,
//! whether a caller may fetch a document's bytes, performs the proxy
//! fetch, and translates storage faults so nothing from the storage layer
//! leaks to the caller.
//!
//! ## Authorization
//!
//! - Owners fetch their own documents in any status.
//! - Admins fetch any document; every admin access is appended to the
//!   audit sink.
//! - Everyone else is `Forbidden`, resolved before any blob I/O and
//!   without an audit entry.
//!
//! ## Fault Translation
//!
//! A blob missing behind a registered key is a registry/blob divergence:
//! logged as a fault, surfaced as [`KycError::StorageInconsistency`]. A
//! fetch that outlives its deadline releases the request and surfaces
//! [`KycError::StorageTimeout`].

use std::sync::Arc;
use std::time::Duration;

use solara_core::{DocumentId, RequesterRole, Timestamp, UserId};

use crate::audit::{AuditAction, AuditEntry, AuditSink};
use crate::blob::{BlobError, BlobStore};
use crate::document::Document;
use crate::error::KycError;
use crate::store::DocumentStore;

/// The kind of read access being mediated, for audit attribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessAction {
    /// Inline fetch for preview/streaming.
    Proxy,
    /// Attachment download.
    Download,
}

impl AccessAction {
    fn audit_action(self) -> AuditAction {
        match self {
            Self::Proxy => AuditAction::AdminProxy,
            Self::Download => AuditAction::AdminDownload,
        }
    }
}

/// An authorized byte payload ready for the response layer.
#[derive(Debug, Clone)]
pub struct DocumentContent {
    /// The bytes served — the full payload, or the requested range.
    pub bytes: Vec<u8>,
    /// Sniffed MIME type from the document record.
    pub mime_type: String,
    /// Total stored size, for `Content-Range` headers.
    pub total_size: u64,
    /// The inclusive byte range served, when partial.
    pub range: Option<(u64, u64)>,
}

/// Authorizes and performs document byte retrieval.
pub struct AccessMediator {
    store: Arc<dyn DocumentStore>,
    blobs: Arc<dyn BlobStore>,
    audit: Arc<dyn AuditSink>,
    fetch_timeout: Duration,
}

impl AccessMediator {
    /// Assemble a mediator over explicit collaborators.
    pub fn new(
        store: Arc<dyn DocumentStore>,
        blobs: Arc<dyn BlobStore>,
        audit: Arc<dyn AuditSink>,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            store,
            blobs,
            audit,
            fetch_timeout,
        }
    }

    /// Authorize `requester` against the document and fetch its bytes.
    ///
    /// `range_header` is an optional `Range` header value; a malformed or
    /// unsatisfiable range falls back to the full payload rather than
    /// failing the request.
    pub async fn authorize_and_fetch(
        &self,
        id: DocumentId,
        requester: UserId,
        role: RequesterRole,
        action: AccessAction,
        range_header: Option<&str>,
    ) -> Result<DocumentContent, KycError> {
        let doc = self.store.get(id).await?;

        if !doc.is_owned_by(requester) && !role.is_admin() {
            tracing::debug!(document_id = %id, requester = %requester, "document access denied");
            return Err(KycError::Forbidden(format!(
                "{requester} may not fetch {id}"
            )));
        }

        // Admin access is always audited, including to their own documents.
        if role.is_admin() {
            self.audit
                .record(AuditEntry {
                    requester_id: requester,
                    document_id: id,
                    action: action.audit_action(),
                    occurred_at: Timestamp::now(),
                })
                .await?;
        }

        let range = range_header.and_then(|h| parse_range(h, doc.size_bytes));
        self.fetch(&doc, range).await
    }

    async fn fetch(
        &self,
        doc: &Document,
        range: Option<(u64, u64)>,
    ) -> Result<DocumentContent, KycError> {
        let fetch = async {
            match range {
                Some((start, end)) => self.blobs.get_range(doc.storage_key, start, end).await,
                None => self.blobs.get(doc.storage_key).await,
            }
        };

        let fetched = match tokio::time::timeout(self.fetch_timeout, fetch).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    document_id = %doc.id,
                    storage_key = %doc.storage_key,
                    timeout_ms = self.fetch_timeout.as_millis() as u64,
                    "blob fetch timed out"
                );
                return Err(KycError::StorageTimeout);
            }
        };

        let bytes = match fetched {
            Ok(bytes) => bytes,
            Err(BlobError::Missing(key)) => {
                tracing::error!(
                    document_id = %doc.id,
                    storage_key = %key,
                    "registry holds a key the blob store cannot resolve"
                );
                return Err(KycError::StorageInconsistency);
            }
            Err(BlobError::Io(detail)) => {
                tracing::error!(document_id = %doc.id, error = %detail, "blob fetch failed");
                return Err(KycError::Backend("blob fetch failed".to_string()));
            }
        };

        Ok(DocumentContent {
            bytes,
            mime_type: doc.mime_type.clone(),
            total_size: doc.size_bytes,
            range,
        })
    }
}

/// Parse a `Range` header value against a known total size.
///
/// Supports the single-range forms `bytes=a-b`, `bytes=a-`, and
/// `bytes=-n`. Returns the inclusive `(start, end)` to serve, clamped to
/// the payload, or `None` for anything malformed or unsatisfiable — the
/// caller then serves the full payload.
pub fn parse_range(header: &str, total_size: u64) -> Option<(u64, u64)> {
    if total_size == 0 {
        return None;
    }
    let spec = header.strip_prefix("bytes=")?.trim();
    if spec.contains(',') {
        // Multi-range requests are not supported; serve the full payload.
        return None;
    }
    let (start_s, end_s) = spec.split_once('-')?;

    let last = total_size - 1;
    match (start_s.is_empty(), end_s.is_empty()) {
        // bytes=-n : final n bytes.
        (true, false) => {
            let n: u64 = end_s.parse().ok()?;
            if n == 0 {
                return None;
            }
            Some((total_size.saturating_sub(n), last))
        }
        // bytes=a- : from a to the end.
        (false, true) => {
            let start: u64 = start_s.parse().ok()?;
            (start <= last).then_some((start, last))
        }
        // bytes=a-b : inclusive range, clamped.
        (false, false) => {
            let start: u64 = start_s.parse().ok()?;
            let end: u64 = end_s.parse().ok()?;
            (start <= end && start <= last).then_some((start, end.min(last)))
        }
        (true, true) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::InMemoryAuditLog;
    use crate::blob::InMemoryBlobStore;
    use crate::category::DocumentCategory;
    use crate::store::{DocumentStore, InMemoryDocumentStore};
    use crate::testutil::new_document;

    struct Harness {
        mediator: AccessMediator,
        store: Arc<InMemoryDocumentStore>,
        blobs: Arc<InMemoryBlobStore>,
        audit: Arc<InMemoryAuditLog>,
    }

    fn harness() -> Harness {
        let store = Arc::new(InMemoryDocumentStore::new());
        let blobs = Arc::new(InMemoryBlobStore::new());
        let audit = Arc::new(InMemoryAuditLog::new());
        let mediator = AccessMediator::new(
            store.clone(),
            blobs.clone(),
            audit.clone(),
            Duration::from_secs(5),
        );
        Harness {
            mediator,
            store,
            blobs,
            audit,
        }
    }

    async fn stored_doc(h: &Harness, owner: UserId, payload: &[u8]) -> Document {
        let mut new = new_document(owner, DocumentCategory::NationalId);
        new.size_bytes = payload.len() as u64;
        let doc = h.store.create(new).await.unwrap();
        h.blobs.put(doc.storage_key, payload.to_vec()).await.unwrap();
        doc
    }

    #[tokio::test]
    async fn test_owner_fetches_own_document_without_audit() {
        let h = harness();
        let owner = UserId::new();
        let doc = stored_doc(&h, owner, b"owner bytes").await;

        let content = h
            .mediator
            .authorize_and_fetch(doc.id, owner, RequesterRole::User, AccessAction::Download, None)
            .await
            .unwrap();
        assert_eq!(content.bytes, b"owner bytes");
        assert_eq!(content.total_size, 11);
        assert!(content.range.is_none());
        assert!(h.audit.is_empty());
    }

    #[tokio::test]
    async fn test_stranger_is_forbidden_without_audit_or_bytes() {
        let h = harness();
        let doc = stored_doc(&h, UserId::new(), b"secret").await;

        let err = h
            .mediator
            .authorize_and_fetch(
                doc.id,
                UserId::new(),
                RequesterRole::User,
                AccessAction::Download,
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, KycError::Forbidden(_)));
        assert!(h.audit.is_empty());
    }

    #[tokio::test]
    async fn test_admin_access_is_audited() {
        let h = harness();
        let doc = stored_doc(&h, UserId::new(), b"compliance evidence").await;
        let admin = UserId::new();

        h.mediator
            .authorize_and_fetch(doc.id, admin, RequesterRole::Admin, AccessAction::Proxy, None)
            .await
            .unwrap();
        h.mediator
            .authorize_and_fetch(
                doc.id,
                admin,
                RequesterRole::Admin,
                AccessAction::Download,
                None,
            )
            .await
            .unwrap();

        let entries = h.audit.entries_for(doc.id).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].action, AuditAction::AdminProxy);
        assert_eq!(entries[1].action, AuditAction::AdminDownload);
        assert_eq!(entries[0].requester_id, admin);
    }

    #[tokio::test]
    async fn test_missing_blob_surfaces_storage_inconsistency() {
        let h = harness();
        let owner = UserId::new();
        let doc = h
            .store
            .create(new_document(owner, DocumentCategory::NationalId))
            .await
            .unwrap();
        // No blob behind the key.

        let err = h
            .mediator
            .authorize_and_fetch(
                doc.id,
                UserId::new(),
                RequesterRole::Admin,
                AccessAction::Proxy,
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, KycError::StorageInconsistency));
        // The message carries no storage detail.
        assert!(!err.to_string().contains("blob"));
        // The attempted access was still audited.
        assert_eq!(h.audit.entries_for(doc.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_range_request_served_partially() {
        let h = harness();
        let owner = UserId::new();
        let doc = stored_doc(&h, owner, b"0123456789").await;

        let content = h
            .mediator
            .authorize_and_fetch(
                doc.id,
                owner,
                RequesterRole::User,
                AccessAction::Proxy,
                Some("bytes=2-5"),
            )
            .await
            .unwrap();
        assert_eq!(content.bytes, b"2345");
        assert_eq!(content.range, Some((2, 5)));
        assert_eq!(content.total_size, 10);
    }

    #[tokio::test]
    async fn test_malformed_range_falls_back_to_full_body() {
        let h = harness();
        let owner = UserId::new();
        let doc = stored_doc(&h, owner, b"0123456789").await;

        for bad in ["bytes=banana", "bytes=5-2", "bytes=-", "pages=1-2", "bytes=99-"] {
            let content = h
                .mediator
                .authorize_and_fetch(
                    doc.id,
                    owner,
                    RequesterRole::User,
                    AccessAction::Proxy,
                    Some(bad),
                )
                .await
                .unwrap();
            assert_eq!(content.bytes, b"0123456789", "range {bad:?} should fall back");
            assert!(content.range.is_none());
        }
    }

    #[tokio::test]
    async fn test_fetch_timeout_surfaces_storage_timeout() {
        use crate::blob::BlobError;
        use async_trait::async_trait;
        use solara_core::StorageKey;

        struct StalledBlobStore;

        #[async_trait]
        impl crate::blob::BlobStore for StalledBlobStore {
            async fn put(&self, _: StorageKey, _: Vec<u8>) -> Result<(), BlobError> {
                Ok(())
            }
            async fn get(&self, _: StorageKey) -> Result<Vec<u8>, BlobError> {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(Vec::new())
            }
            async fn get_range(&self, _: StorageKey, _: u64, _: u64) -> Result<Vec<u8>, BlobError> {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(Vec::new())
            }
            async fn delete(&self, _: StorageKey) -> Result<(), BlobError> {
                Ok(())
            }
        }

        let store = Arc::new(InMemoryDocumentStore::new());
        let owner = UserId::new();
        let doc = store
            .create(new_document(owner, DocumentCategory::NationalId))
            .await
            .unwrap();
        let mediator = AccessMediator::new(
            store,
            Arc::new(StalledBlobStore),
            Arc::new(InMemoryAuditLog::new()),
            Duration::from_millis(20),
        );

        let err = mediator
            .authorize_and_fetch(doc.id, owner, RequesterRole::User, AccessAction::Proxy, None)
            .await
            .unwrap_err();
        assert!(matches!(err, KycError::StorageTimeout));
    }

    // ── parse_range ──────────────────────────────────────────────────

    #[test]
    fn test_parse_range_forms() {
        assert_eq!(parse_range("bytes=0-4", 10), Some((0, 4)));
        assert_eq!(parse_range("bytes=3-", 10), Some((3, 9)));
        assert_eq!(parse_range("bytes=-2", 10), Some((8, 9)));
        // End clamped to the payload.
        assert_eq!(parse_range("bytes=4-100", 10), Some((4, 9)));
        // Suffix longer than the payload serves everything.
        assert_eq!(parse_range("bytes=-50", 10), Some((0, 9)));
    }

    #[test]
    fn test_parse_range_rejects_malformed() {
        assert_eq!(parse_range("bytes=5-2", 10), None);
        assert_eq!(parse_range("bytes=10-", 10), None);
        assert_eq!(parse_range("bytes=-0", 10), None);
        assert_eq!(parse_range("bytes=-", 10), None);
        assert_eq!(parse_range("bytes=0-4,6-8", 10), None);
        assert_eq!(parse_range("items=0-4", 10), None);
        assert_eq!(parse_range("bytes=a-b", 10), None);
        assert_eq!(parse_range("bytes=0-4", 0), None);
    }
}
