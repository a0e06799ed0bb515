//! # KYC Error Taxonomy
//!
//! The domain error hierarchy for the document/KYC workflow. Every
//! component boundary resolves into this taxonomy:
//!
//! - `Validation`, `Forbidden`, `NotFound` — user-recoverable, resolved
//!   before any storage I/O.
//! - `InvalidTransition` — state-machine violation, including lost review
//!   races. Surfaced as a conflict; the caller must re-fetch.
//! - `DuplicateStorageKey` — an integrity fault, not a user error. Should
//!   not occur under correct key generation.
//! - `StorageInconsistency`, `StorageTimeout`, `Backend` — collaborator
//!   faults, logged operationally and surfaced to callers as generic
//!   retryable failures without internal detail.
//!
//! No error kind terminates the process; all are per-request.

use thiserror::Error;

use solara_core::{DocumentId, StorageKey};

use crate::document::DocumentStatus;

/// Top-level error type for the document/KYC workflow.
#[derive(Error, Debug)]
pub enum KycError {
    /// Bad input: size, type, category, or a missing review note.
    #[error("validation error: {0}")]
    Validation(String),

    /// The requester may not perform this operation on this document.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The document (or owner) does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A status transition violated the monotonic state machine, or lost
    /// a review race. The document's current status is included so the
    /// caller can reconcile without another fetch.
    #[error("invalid transition for {document_id}: document is {current}")]
    InvalidTransition {
        /// The document whose transition was rejected.
        document_id: DocumentId,
        /// The status the document currently holds.
        current: DocumentStatus,
    },

    /// A storage key was already bound to another document record.
    /// Integrity fault — keys are generated fresh per upload and never
    /// reused after deletion.
    #[error("storage key already bound: {0}")]
    DuplicateStorageKey(StorageKey),

    /// The registry and the blob store disagree: a registered key has no
    /// blob behind it. Logged as a fault; the message here is safe to
    /// show callers.
    #[error("stored content is unavailable")]
    StorageInconsistency,

    /// A blob fetch exceeded its deadline.
    #[error("stored content retrieval timed out")]
    StorageTimeout,

    /// A backing-store operation failed. The message is an internal
    /// detail; HTTP mapping must not echo it to the caller.
    #[error("backend error: {0}")]
    Backend(String),
}

impl KycError {
    /// Whether this error is an operational fault (as opposed to a
    /// user-recoverable request error). Faults are logged at error level.
    pub fn is_fault(&self) -> bool {
        matches!(
            self,
            Self::DuplicateStorageKey(_)
                | Self::StorageInconsistency
                | Self::StorageTimeout
                | Self::Backend(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fault_classification() {
        assert!(KycError::StorageInconsistency.is_fault());
        assert!(KycError::Backend("pool exhausted".into()).is_fault());
        assert!(!KycError::Forbidden("not the owner".into()).is_fault());
        assert!(!KycError::NotFound("no such document".into()).is_fault());
    }

    #[test]
    fn test_invalid_transition_names_current_status() {
        let err = KycError::InvalidTransition {
            document_id: DocumentId::new(),
            current: DocumentStatus::Approved,
        };
        assert!(err.to_string().contains("approved"));
    }

    #[test]
    fn test_storage_faults_carry_no_internal_detail() {
        assert_eq!(
            KycError::StorageInconsistency.to_string(),
            "stored content is unavailable"
        );
        assert_eq!(
            KycError::StorageTimeout.to_string(),
            "stored content retrieval timed out"
        );
    }
}
