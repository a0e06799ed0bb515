//! # Upload Validation
//!
//! Enforces file-type, size, and content-sniffing rules before a document
//! is admitted to the registry. Validation is pure: it reads the fully
//! buffered upload, persists nothing, and either rejects the upload or
//! returns the captures (`category`, sniffed MIME type, byte length,
//! checksum) the registry persists verbatim.
//!
//! ## Invariant
//!
//! The declared MIME type is never trusted downstream. The sniffed type
//! must agree with the declaration, and only the sniffed type reaches the
//! document record. A terminated upload never produces a partial record
//! because the caller runs validate-then-create, never create-then-backfill.

use thiserror::Error;

use solara_core::{sha256_digest, ContentDigest};

use crate::category::DocumentCategory;

/// Magic-byte signatures for the accepted content types.
const PDF_MAGIC: &[u8] = b"%PDF-";
const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF];
const PNG_MAGIC: &[u8] = &[0x89, 0x50, 0x4E, 0x47];

/// Rejections the validator can produce.
///
/// Each variant corresponds to one rule class so tests and callers can
/// distinguish a size breach from a type mismatch without string matching.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum UploadError {
    /// Zero-length upload, or size above the configured hard ceiling.
    #[error("invalid size: {0}")]
    InvalidSize(String),

    /// Declared type outside the category allow-list, or magic bytes
    /// disagreeing with the declaration.
    #[error("invalid type: {0}")]
    InvalidType(String),

    /// The category string is not a recognized enumerated value.
    #[error("invalid category: {0:?}")]
    InvalidCategory(String),
}

/// Configured upload ceilings. A single hard, category-independent limit.
#[derive(Debug, Clone, Copy)]
pub struct UploadLimits {
    /// Maximum accepted upload size in bytes, inclusive.
    pub max_size_bytes: u64,
}

impl Default for UploadLimits {
    fn default() -> Self {
        // 10 MiB accommodates multi-page scanned statements.
        Self {
            max_size_bytes: 10 * 1024 * 1024,
        }
    }
}

/// The captures of a successful validation, persisted verbatim by the
/// registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedUpload {
    /// Parsed compliance category.
    pub category: DocumentCategory,
    /// The sniffed MIME type — not the declared one.
    pub mime_type: String,
    /// Byte length of the full upload.
    pub size_bytes: u64,
    /// SHA-256 checksum of the full upload.
    pub checksum: ContentDigest,
}

/// Validate an upload against size, category, and content rules.
///
/// The caller must have consumed the entire input stream into `bytes`
/// before calling — size enforcement and the checksum both cover the
/// complete content.
///
/// # Errors
///
/// - [`UploadError::InvalidCategory`] — unknown `category` string.
/// - [`UploadError::InvalidSize`] — empty upload or above `limits`.
/// - [`UploadError::InvalidType`] — declared type not allowed for the
///   category, or content sniffing disagrees with the declaration.
pub fn validate_upload(
    bytes: &[u8],
    declared_mime: &str,
    category: &str,
    limits: &UploadLimits,
) -> Result<ValidatedUpload, UploadError> {
    let category = DocumentCategory::parse(category)
        .ok_or_else(|| UploadError::InvalidCategory(category.to_string()))?;

    let size_bytes = bytes.len() as u64;
    if size_bytes == 0 {
        return Err(UploadError::InvalidSize("empty upload".to_string()));
    }
    if size_bytes > limits.max_size_bytes {
        return Err(UploadError::InvalidSize(format!(
            "{size_bytes} bytes exceeds the {} byte ceiling",
            limits.max_size_bytes
        )));
    }

    let declared = normalize_mime(declared_mime);
    if !category.allowed_mime_types().contains(&declared.as_str()) {
        return Err(UploadError::InvalidType(format!(
            "{declared} is not accepted for category {category}"
        )));
    }

    let sniffed = sniff_mime(bytes).ok_or_else(|| {
        UploadError::InvalidType("content does not match any accepted type".to_string())
    })?;
    if sniffed != declared {
        return Err(UploadError::InvalidType(format!(
            "declared {declared} but content is {sniffed}"
        )));
    }

    Ok(ValidatedUpload {
        category,
        mime_type: sniffed.to_string(),
        size_bytes,
        checksum: sha256_digest(bytes),
    })
}

/// Identify the content type from leading magic bytes.
///
/// Returns `None` for content that matches no accepted signature — such
/// uploads are rejected regardless of what type was declared.
pub fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(PDF_MAGIC) {
        Some("application/pdf")
    } else if bytes.starts_with(JPEG_MAGIC) {
        Some("image/jpeg")
    } else if bytes.starts_with(PNG_MAGIC) {
        Some("image/png")
    } else {
        None
    }
}

/// Normalize common MIME aliases to their canonical form.
fn normalize_mime(mime: &str) -> String {
    let lowered = mime.trim().to_ascii_lowercase();
    match lowered.as_str() {
        "image/jpg" => "image/jpeg".to_string(),
        _ => lowered,
    }
}
