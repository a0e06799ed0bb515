//! # Content Digest — Upload Checksums
//!
//! Defines `ContentDigest` and `DigestAlgorithm` for the checksums the
//! upload validator computes over incoming file bytes. The checksum is
//! captured once at validation time, persisted verbatim on the document
//! record, and never recomputed from untrusted input downstream.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// The hash algorithm used to produce a content digest.
///
/// SHA-256 is the only algorithm in use today; the tag exists so stored
/// checksums remain self-describing if the algorithm is ever migrated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    /// SHA-256 — the standard content checksum.
    Sha256,
}

impl DigestAlgorithm {
    /// Returns the algorithm identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
        }
    }
}

impl std::fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A content digest with its algorithm tag.
///
/// Produced from raw file bytes via [`sha256_digest()`]. The 32-byte
/// digest and algorithm tag together form a self-describing checksum,
/// rendered on the wire as `sha256:<64 hex chars>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentDigest {
    /// The hash algorithm that produced this digest.
    pub algorithm: DigestAlgorithm,
    /// The raw 32-byte digest value.
    pub bytes: [u8; 32],
}

impl ContentDigest {
    /// Create a new content digest from raw bytes and algorithm.
    ///
    /// Prefer [`sha256_digest()`] for computing digests from file content.
    pub fn new(algorithm: DigestAlgorithm, bytes: [u8; 32]) -> Self {
        Self { algorithm, bytes }
    }

    /// Render the digest as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.bytes.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Parse a digest from its `algorithm:hex` wire form.
    pub fn parse(s: &str) -> Option<Self> {
        let (algo, hex) = s.split_once(':')?;
        if algo != "sha256" || hex.len() != 64 {
            return None;
        }
        let mut bytes = [0u8; 32];
        for (i, chunk) in hex.as_bytes().chunks(2).enumerate() {
            let pair = std::str::from_utf8(chunk).ok()?;
            bytes[i] = u8::from_str_radix(pair, 16).ok()?;
        }
        Some(Self::new(DigestAlgorithm::Sha256, bytes))
    }
}

impl std::fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.algorithm, self.to_hex())
    }
}

/// Compute a SHA-256 content digest over raw file bytes.
///
/// This is the single checksum computation path for uploaded content.
/// The result carries a `DigestAlgorithm::Sha256` tag.
pub fn sha256_digest(data: &[u8]) -> ContentDigest {
    let hash = Sha256::digest(data);
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&hash);
    ContentDigest::new(DigestAlgorithm::Sha256, bytes)
}

/// Compute a SHA-256 hex string over raw file bytes.
///
/// Convenience wrapper around [`sha256_digest()`] for contexts that need
/// the digest as a bare hex string.
pub fn sha256_hex(data: &[u8]) -> String {
    sha256_digest(data).to_hex()
}
