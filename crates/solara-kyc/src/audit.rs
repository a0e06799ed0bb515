//! # Admin Access Audit Log
//!
//! An append-only sequence of admin document accesses, keyed by
//! (requester, document, timestamp). The audit trail lives beside the
//! documents, never on them — access history must not participate in the
//! document record's invariant set.
//!
//! Only the admin path writes entries. Owner downloads and rejected
//! (forbidden) attempts leave no trace here.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

use solara_core::{DocumentId, Timestamp, UserId};

use crate::error::KycError;

/// What an admin did with a document's bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Inline proxy fetch for compliance preview.
    AdminProxy,
    /// Attachment download.
    AdminDownload,
}

impl AuditAction {
    /// The wire identifier for this action.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AdminProxy => "admin_proxy",
            Self::AdminDownload => "admin_download",
        }
    }

    /// Parse an action from its wire identifier.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "admin_proxy" => Some(Self::AdminProxy),
            "admin_download" => Some(Self::AdminDownload),
            _ => None,
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded admin access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// The admin who fetched the document.
    pub requester_id: UserId,
    /// The document that was fetched.
    pub document_id: DocumentId,
    /// The kind of access.
    pub action: AuditAction,
    /// When the access happened.
    pub occurred_at: Timestamp,
}

/// An append-only audit sink.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Append one entry. Entries are never updated or removed.
    async fn record(&self, entry: AuditEntry) -> Result<(), KycError>;

    /// All entries for a document, oldest first.
    async fn entries_for(&self, document: DocumentId) -> Result<Vec<AuditEntry>, KycError>;
}

/// An audit log held in process memory, for tests and the dev server.
#[derive(Default)]
pub struct InMemoryAuditLog {
    entries: Mutex<Vec<AuditEntry>>,
}

impl InMemoryAuditLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of recorded entries.
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl AuditSink for InMemoryAuditLog {
    async fn record(&self, entry: AuditEntry) -> Result<(), KycError> {
        self.entries
            .lock()
            .map_err(|_| KycError::Backend("audit log lock poisoned".to_string()))?
            .push(entry);
        Ok(())
    }

    async fn entries_for(&self, document: DocumentId) -> Result<Vec<AuditEntry>, KycError> {
        Ok(self
            .entries
            .lock()
            .map_err(|_| KycError::Backend("audit log lock poisoned".to_string()))?
            .iter()
            .filter(|e| e.document_id == document)
            .cloned()
            .collect())
    }
}
