//! Shared test fixtures for the crate's unit tests.

use solara_core::{sha256_digest, DocumentId, StorageKey, Timestamp, UserId};

use crate::category::DocumentCategory;
use crate::document::{Document, DocumentStatus, NewDocument};

/// A pending document with fixed validation captures.
pub(crate) fn sample_document(owner: UserId, category: DocumentCategory) -> Document {
    let now = Timestamp::now();
    Document {
        id: DocumentId::new(),
        owner_id: owner,
        category,
        storage_key: StorageKey::new(),
        mime_type: "application/pdf".to_string(),
        size_bytes: 4,
        checksum: sha256_digest(b"test"),
        status: DocumentStatus::Pending,
        reviewer_id: None,
        review_note: None,
        reviewed_at: None,
        created_at: now,
        updated_at: now,
    }
}

/// Creation input for a fresh pending document.
pub(crate) fn new_document(owner: UserId, category: DocumentCategory) -> NewDocument {
    NewDocument {
        owner_id: owner,
        category,
        storage_key: StorageKey::new(),
        mime_type: "application/pdf".to_string(),
        size_bytes: 4,
        checksum: sha256_digest(b"test"),
    }
}

/// A minimal well-formed PDF payload for validator and upload tests.
pub(crate) fn pdf_bytes() -> Vec<u8> {
    let mut bytes = b"%PDF-1.7\n".to_vec();
    bytes.extend_from_slice(b"1 0 obj\n<< /Type /Catalog >>\nendobj\n%%EOF\n");
    bytes
}
