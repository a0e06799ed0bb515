//! # solara-core — Foundational Types for the Solara Platform
//!
//! This crate is the bedrock of the Solara document and KYC services. It
//! defines the type-system primitives shared by every other crate in the
//! workspace; it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** `UserId`, `DocumentId`,
//!    `StorageKey` — all newtypes over `Uuid`. No bare strings or raw UUIDs
//!    for identifiers, so a user identifier can never be passed where a
//!    blob-store handle is expected.
//!
//! 2. **UTC-only timestamps.** The `Timestamp` type enforces UTC with Z
//!    suffix and seconds precision, so lifecycle fields (`created_at`,
//!    `reviewed_at`) serialize identically everywhere.
//!
//! 3. **`ContentDigest` for file checksums.** All upload checksums are
//!    SHA-256 digests computed through [`sha256_digest()`] and carry an
//!    algorithm tag for forward migration.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `solara-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - All public types derive `Debug`, `Clone`, and implement
//!   `Serialize`/`Deserialize`.

pub mod digest;
pub mod error;
pub mod identity;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use digest::{sha256_digest, sha256_hex, ContentDigest, DigestAlgorithm};
pub use error::CoreError;
pub use identity::{DocumentId, RequesterRole, StorageKey, UserId};
pub use temporal::Timestamp;
