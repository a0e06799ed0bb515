//! # Review Engine
//!
//! The state machine governing `Pending → Approved/Rejected` transitions
//! and the derived per-user KYC aggregate.
//!
//! ## Concurrency
//!
//! The engine holds no lock. Transitions delegate to the store's
//! conditional update, so two reviewers racing on the same pending
//! document resolve to exactly one winner; the loser observes
//! [`KycError::InvalidTransition`] with the winner's status.
//!
//! ## Idempotency
//!
//! Review tooling retries and admins double-click. Re-applying the *same*
//! terminal status returns the existing record unchanged — same reviewer
//! fields, same `reviewed_at` — rather than erroring. Applying the
//! *opposite* terminal status stays an invalid transition.
//!
//! ## The KYC Aggregate
//!
//! Derived, never persisted: recomputed on every read from the owner's
//! document list, so there is no second source of truth to go stale.
//! Within each required category the most recently created document wins,
//! which lets a user resubmit after a rejection without mutating history.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use solara_core::{DocumentId, Timestamp, UserId};

use crate::category::{DocumentCategory, ProfileType};
use crate::document::{Document, DocumentStatus};
use crate::error::KycError;
use crate::store::DocumentStore;

/// The derived verification state of one user's document set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KycStatus {
    /// One or more required categories have no submission.
    Incomplete,
    /// All required categories submitted, at least one still pending.
    UnderReview,
    /// Every required category's latest submission is approved.
    Verified,
    /// Some required category's latest submission is rejected, with no
    /// superseding resubmission.
    Rejected,
}

impl std::fmt::Display for KycStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Incomplete => f.write_str("incomplete"),
            Self::UnderReview => f.write_str("under_review"),
            Self::Verified => f.write_str("verified"),
            Self::Rejected => f.write_str("rejected"),
        }
    }
}

/// Approves and rejects documents, and derives KYC aggregates.
pub struct ReviewEngine {
    store: Arc<dyn DocumentStore>,
}

impl ReviewEngine {
    /// Assemble an engine over the document store.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Approve a pending document.
    ///
    /// # Errors
    ///
    /// - [`KycError::NotFound`] — unknown document.
    /// - [`KycError::InvalidTransition`] — the document is rejected, or
    ///   this call lost a race to a rejecting reviewer.
    pub async fn approve(
        &self,
        id: DocumentId,
        reviewer: UserId,
        note: Option<String>,
    ) -> Result<Document, KycError> {
        self.transition(id, DocumentStatus::Approved, reviewer, note)
            .await
    }

    /// Reject a pending document. The note is mandatory so the owner has
    /// actionable feedback.
    ///
    /// # Errors
    ///
    /// - [`KycError::Validation`] — empty or blank note.
    /// - [`KycError::NotFound`] — unknown document.
    /// - [`KycError::InvalidTransition`] — the document is approved, or
    ///   this call lost a race to an approving reviewer.
    pub async fn reject(
        &self,
        id: DocumentId,
        reviewer: UserId,
        note: String,
    ) -> Result<Document, KycError> {
        if note.trim().is_empty() {
            return Err(KycError::Validation(
                "rejection requires a non-empty review note".to_string(),
            ));
        }
        self.transition(id, DocumentStatus::Rejected, reviewer, Some(note))
            .await
    }

    async fn transition(
        &self,
        id: DocumentId,
        to: DocumentStatus,
        reviewer: UserId,
        note: Option<String>,
    ) -> Result<Document, KycError> {
        let attempt = self
            .store
            .transition(id, to, reviewer, note, Timestamp::now())
            .await;

        match attempt {
            Ok(doc) => {
                tracing::info!(
                    document_id = %id,
                    reviewer = %reviewer,
                    status = %doc.status,
                    "document reviewed"
                );
                Ok(doc)
            }
            // Duplicate click tolerance: the record already carries the
            // requested terminal status, so hand it back unchanged.
            Err(KycError::InvalidTransition { current, .. }) if current == to => {
                self.store.get(id).await
            }
            Err(e) => Err(e),
        }
    }

    /// Documents awaiting review, in creation order.
    pub async fn pending_queue(&self) -> Result<Vec<Document>, KycError> {
        self.store.list_pending().await
    }

    /// Derive the KYC aggregate for an owner against their profile's
    /// required categories.
    pub async fn kyc_status(
        &self,
        owner: UserId,
        profile: ProfileType,
    ) -> Result<KycStatus, KycError> {
        let documents = self.store.list_by_owner(owner).await?;
        Ok(compute_kyc_status(
            &documents,
            profile.required_categories(),
        ))
    }

    /// The required categories an owner has not yet submitted.
    pub async fn missing_categories(
        &self,
        owner: UserId,
        profile: ProfileType,
    ) -> Result<Vec<DocumentCategory>, KycError> {
        let documents = self.store.list_by_owner(owner).await?;
        Ok(profile
            .required_categories()
            .iter()
            .copied()
            .filter(|cat| !documents.iter().any(|d| d.category == *cat))
            .collect())
    }
}

/// Reduce a creation-ordered document list to a KYC aggregate.
///
/// Pure over its inputs. Within each required category the last document
/// in the list (the most recently created) supersedes earlier ones, even
/// if the earlier one was rejected — a pending resubmission therefore
/// moves a rejected category back under review.
pub fn compute_kyc_status(
    documents: &[Document],
    required: &[DocumentCategory],
) -> KycStatus {
    let mut any_pending = false;
    let mut any_rejected = false;

    for category in required {
        let latest = documents.iter().rev().find(|d| d.category == *category);
        match latest {
            None => return KycStatus::Incomplete,
            Some(doc) => match doc.status {
                DocumentStatus::Pending => any_pending = true,
                DocumentStatus::Rejected => any_rejected = true,
                DocumentStatus::Approved => {}
            },
        }
    }

    if any_rejected {
        KycStatus::Rejected
    } else if any_pending {
        KycStatus::UnderReview
    } else {
        KycStatus::Verified
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryDocumentStore;
    use crate::testutil::new_document;

    fn engine() -> (ReviewEngine, Arc<InMemoryDocumentStore>) {
        let store = Arc::new(InMemoryDocumentStore::new());
        (ReviewEngine::new(store.clone()), store)
    }

    async fn pending_doc(
        store: &InMemoryDocumentStore,
        owner: UserId,
        category: DocumentCategory,
    ) -> Document {
        store.create(new_document(owner, category)).await.unwrap()
    }

    #[tokio::test]
    async fn test_approve_sets_terminal_fields() {
        let (engine, store) = engine();
        let doc = pending_doc(&store, UserId::new(), DocumentCategory::NationalId).await;
        let reviewer = UserId::new();

        let approved = engine.approve(doc.id, reviewer, None).await.unwrap();
        assert_eq!(approved.status, DocumentStatus::Approved);
        assert_eq!(approved.reviewer_id, Some(reviewer));
        assert!(approved.review_fields_consistent());
    }

    #[tokio::test]
    async fn test_approve_is_idempotent() {
        let (engine, store) = engine();
        let doc = pending_doc(&store, UserId::new(), DocumentCategory::NationalId).await;
        let reviewer = UserId::new();

        let first = engine.approve(doc.id, reviewer, None).await.unwrap();
        let second = engine.approve(doc.id, reviewer, None).await.unwrap();
        assert_eq!(second.status, DocumentStatus::Approved);
        assert_eq!(second.reviewed_at, first.reviewed_at);
        assert_eq!(second.reviewer_id, first.reviewer_id);
    }

    #[tokio::test]
    async fn test_approve_after_reject_is_invalid() {
        let (engine, store) = engine();
        let doc = pending_doc(&store, UserId::new(), DocumentCategory::NationalId).await;
        let reviewer = UserId::new();

        let rejected = engine
            .reject(doc.id, reviewer, "blurry".to_string())
            .await
            .unwrap();
        assert_eq!(rejected.review_note.as_deref(), Some("blurry"));

        let err = engine.approve(doc.id, reviewer, None).await.unwrap_err();
        assert!(matches!(
            err,
            KycError::InvalidTransition {
                current: DocumentStatus::Rejected,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_reject_requires_note() {
        let (engine, store) = engine();
        let doc = pending_doc(&store, UserId::new(), DocumentCategory::NationalId).await;

        let err = engine
            .reject(doc.id, UserId::new(), "   ".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, KycError::Validation(_)));

        // Still pending — the invalid call mutated nothing.
        let current = store.get(doc.id).await.unwrap();
        assert_eq!(current.status, DocumentStatus::Pending);
    }

    #[tokio::test]
    async fn test_pending_queue_excludes_reviewed() {
        let (engine, store) = engine();
        let owner = UserId::new();
        let a = pending_doc(&store, owner, DocumentCategory::NationalId).await;
        let b = pending_doc(&store, owner, DocumentCategory::BankStatement).await;

        engine.approve(a.id, UserId::new(), None).await.unwrap();
        let queue = engine.pending_queue().await.unwrap();
        assert_eq!(queue.iter().map(|d| d.id).collect::<Vec<_>>(), vec![b.id]);
    }

    #[tokio::test]
    async fn test_aggregate_incomplete_until_all_required_present() {
        let (engine, store) = engine();
        let owner = UserId::new();
        pending_doc(&store, owner, DocumentCategory::NationalId).await;

        let status = engine
            .kyc_status(owner, ProfileType::Consumer)
            .await
            .unwrap();
        assert_eq!(status, KycStatus::Incomplete);

        let missing = engine
            .missing_categories(owner, ProfileType::Consumer)
            .await
            .unwrap();
        assert_eq!(
            missing,
            vec![
                DocumentCategory::ProofOfAddress,
                DocumentCategory::BankStatement
            ]
        );
    }

    #[tokio::test]
    async fn test_aggregate_under_review_then_verified() {
        let (engine, store) = engine();
        let owner = UserId::new();
        let mut ids = Vec::new();
        for cat in ProfileType::Consumer.required_categories() {
            ids.push(pending_doc(&store, owner, *cat).await.id);
        }

        assert_eq!(
            engine.kyc_status(owner, ProfileType::Consumer).await.unwrap(),
            KycStatus::UnderReview
        );

        for id in ids {
            engine.approve(id, UserId::new(), None).await.unwrap();
        }
        assert_eq!(
            engine.kyc_status(owner, ProfileType::Consumer).await.unwrap(),
            KycStatus::Verified
        );
    }

    #[tokio::test]
    async fn test_resubmission_supersedes_rejection() {
        let (engine, store) = engine();
        let owner = UserId::new();
        let reviewer = UserId::new();

        // Approve all but national_id, which gets rejected.
        let rejected = pending_doc(&store, owner, DocumentCategory::NationalId).await;
        for cat in [
            DocumentCategory::ProofOfAddress,
            DocumentCategory::BankStatement,
        ] {
            let doc = pending_doc(&store, owner, cat).await;
            engine.approve(doc.id, reviewer, None).await.unwrap();
        }
        engine
            .reject(rejected.id, reviewer, "illegible scan".to_string())
            .await
            .unwrap();
        assert_eq!(
            engine.kyc_status(owner, ProfileType::Consumer).await.unwrap(),
            KycStatus::Rejected
        );

        // A fresh upload in the same category supersedes the rejection.
        let resubmitted = pending_doc(&store, owner, DocumentCategory::NationalId).await;
        assert_eq!(
            engine.kyc_status(owner, ProfileType::Consumer).await.unwrap(),
            KycStatus::UnderReview
        );

        engine.approve(resubmitted.id, reviewer, None).await.unwrap();
        assert_eq!(
            engine.kyc_status(owner, ProfileType::Consumer).await.unwrap(),
            KycStatus::Verified
        );
    }

    #[tokio::test]
    async fn test_concurrent_reviews_have_one_winner() {
        let (engine, store) = engine();
        let engine = Arc::new(engine);
        let doc = pending_doc(&store, UserId::new(), DocumentCategory::NationalId).await;

        let mut handles = Vec::new();
        for i in 0..6 {
            let engine = Arc::clone(&engine);
            let id = doc.id;
            handles.push(tokio::spawn(async move {
                if i % 2 == 0 {
                    engine.approve(id, UserId::new(), None).await
                } else {
                    engine.reject(id, UserId::new(), format!("note {i}")).await
                }
            }));
        }

        let mut outcomes = Vec::new();
        for handle in handles {
            outcomes.push(handle.await.unwrap());
        }
        // Idempotent duplicates of the winning status also return Ok, so
        // count distinct terminal statuses instead of raw Ok results: all
        // successes must agree on one status.
        let statuses: Vec<DocumentStatus> = outcomes
            .iter()
            .filter_map(|r| r.as_ref().ok().map(|d| d.status))
            .collect();
        assert!(!statuses.is_empty());
        assert!(statuses.windows(2).all(|w| w[0] == w[1]));

        let final_doc = store.get(doc.id).await.unwrap();
        assert!(final_doc.status.is_terminal());
        assert!(final_doc.review_fields_consistent());
    }
}
