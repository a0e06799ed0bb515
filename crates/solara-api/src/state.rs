//! # Application State
//!
//! Shared state for the Axum application. Every service is an explicitly
//! constructed, dependency-injected value assembled once at startup — no
//! lazily-initialized process-wide clients.

use std::sync::Arc;
use std::time::Duration;

use solara_kyc::{
    AccessMediator, AuditSink, BlobStore, DocumentRegistry, DocumentStore, InMemoryAuditLog,
    InMemoryBlobStore, InMemoryDocumentStore, ReviewEngine, UploadLimits,
};

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    /// Intake, listing, and deletion of documents.
    pub registry: Arc<DocumentRegistry>,
    /// Approve/reject transitions and the KYC aggregate.
    pub review: Arc<ReviewEngine>,
    /// Authorized byte retrieval.
    pub mediator: Arc<AccessMediator>,
    /// Upload ceiling, mirrored into the request body limit.
    pub max_upload_bytes: u64,
}

impl AppState {
    /// Assemble the service graph over explicit collaborators.
    pub fn assemble(
        store: Arc<dyn DocumentStore>,
        blobs: Arc<dyn BlobStore>,
        audit: Arc<dyn AuditSink>,
        limits: UploadLimits,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            registry: Arc::new(DocumentRegistry::new(
                store.clone(),
                blobs.clone(),
                limits,
            )),
            review: Arc::new(ReviewEngine::new(store.clone())),
            mediator: Arc::new(AccessMediator::new(store, blobs, audit, fetch_timeout)),
            max_upload_bytes: limits.max_size_bytes,
        }
    }

    /// Fully in-memory state for tests and the development server.
    pub fn in_memory(limits: UploadLimits, fetch_timeout: Duration) -> Self {
        Self::assemble(
            Arc::new(InMemoryDocumentStore::new()),
            Arc::new(InMemoryBlobStore::new()),
            Arc::new(InMemoryAuditLog::new()),
            limits,
            fetch_timeout,
        )
    }
}
