//! # Document Records and Review Status
//!
//! Models one uploaded artifact and its review lifecycle.
//!
//! ## States
//!
//! ```text
//! Pending ──▶ Approved (terminal)
//!    │
//!    ▼
//! Rejected (terminal)
//! ```
//!
//! ## Design Decision
//!
//! Status transitions are monotonic: there is no path out of a terminal
//! state, and no path between `Approved` and `Rejected`. Re-review of a
//! rejected submission happens by uploading a *new* document in the same
//! category — the superseded record stays in the registry as history, and
//! the KYC aggregate picks the latest per category.
//!
//! The machine is an enum with validated transitions rather than
//! typestate types: with one live state and two terminal ones, the
//! invariant is a single runtime check at the store, and the conditional
//! update that enforces it is also what serializes racing reviewers.

use serde::{Deserialize, Serialize};

use solara_core::{ContentDigest, DocumentId, StorageKey, Timestamp, UserId};

use crate::category::DocumentCategory;

/// The review status of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    /// Awaiting review. The only state transitions leave from.
    Pending,
    /// Accepted by a reviewer (terminal).
    Approved,
    /// Declined by a reviewer, with a mandatory note (terminal).
    Rejected,
}

impl DocumentStatus {
    /// Whether this status permits no further transition.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// The wire identifier for this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Parse a status from its wire identifier.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

impl std::fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One uploaded document record.
///
/// The registry is the sole owner of these records and the sole mutator
/// of `status`. Identity fields (`id`, `owner_id`, `category`,
/// `storage_key`) and validation captures (`mime_type`, `size_bytes`,
/// `checksum`) are immutable after creation.
///
/// Invariant: `reviewed_at` is `Some` iff `status` is terminal, and the
/// reviewer fields are set together on exactly one transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Opaque unique identifier, assigned at creation.
    pub id: DocumentId,
    /// The submitting user.
    pub owner_id: UserId,
    /// Compliance category declared at upload.
    pub category: DocumentCategory,
    /// Handle into the blob store. Unique across the registry.
    pub storage_key: StorageKey,
    /// Sniffed MIME type — the declared type is never persisted.
    pub mime_type: String,
    /// Byte length captured at validation time.
    pub size_bytes: u64,
    /// Content checksum captured at validation time.
    pub checksum: ContentDigest,
    /// Current review status.
    pub status: DocumentStatus,
    /// Reviewer who performed the terminal transition.
    pub reviewer_id: Option<UserId>,
    /// Reviewer note; mandatory on rejection.
    pub review_note: Option<String>,
    /// When the terminal transition happened.
    pub reviewed_at: Option<Timestamp>,
    /// Creation timestamp.
    pub created_at: Timestamp,
    /// Last mutation timestamp.
    pub updated_at: Timestamp,
}

impl Document {
    /// Whether the record satisfies the review-field invariant:
    /// `reviewed_at` set iff status is terminal.
    pub fn review_fields_consistent(&self) -> bool {
        self.reviewed_at.is_some() == self.status.is_terminal()
    }

    /// Whether the given user owns this document.
    pub fn is_owned_by(&self, user: UserId) -> bool {
        self.owner_id == user
    }
}

/// The fields the registry needs to create a document record.
///
/// Produced only after upload validation succeeds — there is no path to
/// a registry record that skips the validator.
#[derive(Debug, Clone)]
pub struct NewDocument {
    /// The submitting user.
    pub owner_id: UserId,
    /// Compliance category.
    pub category: DocumentCategory,
    /// Freshly generated blob-store handle.
    pub storage_key: StorageKey,
    /// Sniffed MIME type from the validator.
    pub mime_type: String,
    /// Validated byte length.
    pub size_bytes: u64,
    /// Validated content checksum.
    pub checksum: ContentDigest,
}
