//! # Domain Identity Newtypes
//!
//! Newtype wrappers for the identifiers of the document and KYC services.
//! These prevent accidental identifier confusion — you cannot pass a
//! `UserId` where a `StorageKey` is expected.
//!
//! ## Security Invariant
//!
//! Type-level distinction between identifier namespaces prevents
//! cross-namespace confusion attacks where an attacker substitutes one
//! kind of identifier for another. A `StorageKey` in particular is an
//! opaque handle into the blob store and must never be derived from or
//! interchangeable with a `DocumentId`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;

/// Unique identifier for a platform user (borrower, contractor, reviewer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub Uuid);

/// Unique identifier for an uploaded document record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentId(pub Uuid);

/// Opaque handle binding a document record to its byte payload in the
/// blob store. Generated once at creation and never reused after deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StorageKey(pub Uuid);

/// Parse the prefixed wire form `<prefix>:<uuid>` these identifiers
/// render through `Display`.
fn parse_prefixed(s: &str, prefix: &str) -> Result<Uuid, CoreError> {
    let rest = s
        .strip_prefix(prefix)
        .and_then(|r| r.strip_prefix(':'))
        .ok_or_else(|| {
            CoreError::InvalidIdentifier(format!("expected {prefix}:<uuid>, got {s:?}"))
        })?;
    rest.parse::<Uuid>()
        .map_err(|_| CoreError::InvalidIdentifier(format!("malformed uuid in {s:?}")))
}

impl UserId {
    /// Generate a new random user identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse from the prefixed wire form `user:<uuid>`.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        parse_prefixed(s, "user").map(Self)
    }

    /// Access the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl DocumentId {
    /// Generate a new random document identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse from the prefixed wire form `document:<uuid>`.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        parse_prefixed(s, "document").map(Self)
    }

    /// Access the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl StorageKey {
    /// Generate a new random storage key.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse from the prefixed wire form `blob:<uuid>`.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        parse_prefixed(s, "blob").map(Self)
    }

    /// Access the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for StorageKey {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "user:{}", self.0)
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "document:{}", self.0)
    }
}

impl std::fmt::Display for StorageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "blob:{}", self.0)
    }
}

/// The capability class of a requester, as asserted by the authentication
/// gateway upstream of these services.
///
/// Access decisions in the mediator branch on this role, never on ad-hoc
/// string comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequesterRole {
    /// An ordinary authenticated user; may only access their own documents.
    User,
    /// A compliance administrator; may access any document, audited.
    Admin,
}

impl RequesterRole {
    /// Whether this role carries the admin capability.
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Parse a role from its wire representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" => Some(Self::User),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

impl std::fmt::Display for RequesterRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => f.write_str("user"),
            Self::Admin => f.write_str("admin"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_distinct_on_generation() {
        assert_ne!(UserId::new(), UserId::new());
        assert_ne!(DocumentId::new(), DocumentId::new());
        assert_ne!(StorageKey::new(), StorageKey::new());
    }

    #[test]
    fn test_display_prefixes() {
        let id = DocumentId::new();
        assert!(id.to_string().starts_with("document:"));
        let key = StorageKey::new();
        assert!(key.to_string().starts_with("blob:"));
    }

    #[test]
    fn test_prefixed_parse_roundtrip() {
        let user = UserId::new();
        assert_eq!(UserId::parse(&user.to_string()).unwrap(), user);
        let doc = DocumentId::new();
        assert_eq!(DocumentId::parse(&doc.to_string()).unwrap(), doc);
        let key = StorageKey::new();
        assert_eq!(StorageKey::parse(&key.to_string()).unwrap(), key);
    }

    #[test]
    fn test_prefixed_parse_rejects_wrong_namespace() {
        let doc = DocumentId::new();
        // A document identifier must not parse as a storage key.
        assert!(matches!(
            StorageKey::parse(&doc.to_string()),
            Err(CoreError::InvalidIdentifier(_))
        ));
        assert!(matches!(
            UserId::parse("user:not-a-uuid"),
            Err(CoreError::InvalidIdentifier(_))
        ));
        assert!(matches!(
            DocumentId::parse(""),
            Err(CoreError::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn test_role_parse() {
        assert_eq!(RequesterRole::parse("admin"), Some(RequesterRole::Admin));
        assert_eq!(RequesterRole::parse(" USER "), Some(RequesterRole::User));
        assert_eq!(RequesterRole::parse("root"), None);
    }

    #[test]
    fn test_role_serde_snake_case() {
        let json = serde_json::to_string(&RequesterRole::Admin).unwrap();
        assert_eq!(json, "\"admin\"");
    }

    #[test]
    fn test_id_serde_roundtrip() {
        let id = DocumentId::new();
        let json = serde_json::to_string(&id).unwrap();
        let parsed: DocumentId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, parsed);
    }
}
