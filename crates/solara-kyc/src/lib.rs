//! # solara-kyc — Document Management & Identity Verification
//!
//! Implements the document/KYC workflow of the Solara platform: an uploaded
//! identity or financial document moves from intake, through compliance
//! review, to an access-controlled artifact.
//!
//! ## Components
//!
//! - **Upload validator** (`validate.rs`): size ceiling, per-category MIME
//!   allow-lists, magic-byte sniffing, checksum computation. Pure — no
//!   persistence.
//!
//! - **Document registry** (`registry.rs` over the `store` seam): owns
//!   document records and is the sole mutator of `status`. The
//!   [`store::DocumentStore`] trait has an in-memory implementation for
//!   tests and a Postgres implementation for production.
//!
//! - **Review engine** (`review.rs`): the `Pending → Approved/Rejected`
//!   state machine, plus the derived per-user KYC aggregate. Both terminal
//!   states are final; re-review requires a new document.
//!
//! - **Access mediator** (`mediator.rs`): per-request authorization for
//!   fetch/stream/download, byte-range support, storage-fault translation,
//!   and audit logging of admin access.
//!
//! - **Blob store adapter** (`blob.rs`): opaque key→bytes storage, treated
//!   as an external collaborator behind the [`blob::BlobStore`] trait.
//!
//! ## Concurrency
//!
//! All document mutations are single conditional operations at the backing
//! store. Two reviewers racing on the same pending document are serialized
//! there: exactly one transition wins, the loser observes
//! [`KycError::InvalidTransition`]. No in-process locks guard review state.
//!
//! ## Crate Policy
//!
//! - No HTTP types — the web surface lives in `solara-api`.
//! - Storage-layer errors never escape verbatim; they are translated to
//!   the [`KycError`] taxonomy at each adapter boundary.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod audit;
#[cfg(test)]
pub(crate) mod testutil;
pub mod blob;
pub mod category;
pub mod document;
pub mod error;
pub mod mediator;
pub mod registry;
pub mod review;
pub mod store;
pub mod validate;

// Re-export primary types for ergonomic imports.
pub use audit::{AuditAction, AuditEntry, AuditSink, InMemoryAuditLog};
pub use blob::{BlobError, BlobStore, FsBlobStore, InMemoryBlobStore};
pub use category::{DocumentCategory, ProfileType};
pub use document::{Document, DocumentStatus, NewDocument};
pub use error::KycError;
pub use mediator::{AccessAction, AccessMediator, DocumentContent};
pub use registry::DocumentRegistry;
pub use review::{KycStatus, ReviewEngine};
pub use store::{DocumentStore, InMemoryDocumentStore, PgAuditLog, PgDocumentStore};
pub use validate::{validate_upload, UploadError, UploadLimits, ValidatedUpload};
