//! # Core Error Types
//!
//! Errors raised by the foundational types. All errors use `thiserror`
//! for derive-based `Display` and `Error` implementations. Domain-level
//! errors (state transitions, authorization, storage faults) live in
//! `solara-kyc`; this crate only reports malformed primitive values.

use thiserror::Error;

/// Errors from constructing or parsing core primitives.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A timestamp string was not valid UTC ISO8601.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// An identifier string did not match its prefixed `namespace:<uuid>`
    /// wire form.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),
}
