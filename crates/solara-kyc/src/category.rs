//! # Compliance Categories
//!
//! The fixed classification of document types the platform accepts, and
//! the per-profile sets of categories a user must submit before their KYC
//! aggregate can leave `Incomplete`.
//!
//! Categories are a closed enum. Adding a category forces every consumer
//! (allow-lists, requirement sets, the review queue) to handle it.

use serde::{Deserialize, Serialize};

/// A compliance category for an uploaded document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentCategory {
    /// Government-issued national identity document.
    NationalId,
    /// Proof of residential address (lease, deed, council letter).
    ProofOfAddress,
    /// Bank account statement for affordability checks.
    BankStatement,
    /// Payslip or other income evidence.
    IncomeProof,
    /// Utility bill — also feeds the solar sizing calculator.
    UtilityBill,
    /// Installer license for contractor onboarding.
    ContractorLicense,
}

/// All categories, in wire order. Backs the public category listing.
pub const ALL_CATEGORIES: [DocumentCategory; 6] = [
    DocumentCategory::NationalId,
    DocumentCategory::ProofOfAddress,
    DocumentCategory::BankStatement,
    DocumentCategory::IncomeProof,
    DocumentCategory::UtilityBill,
    DocumentCategory::ContractorLicense,
];

impl DocumentCategory {
    /// The wire identifier for this category.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NationalId => "national_id",
            Self::ProofOfAddress => "proof_of_address",
            Self::BankStatement => "bank_statement",
            Self::IncomeProof => "income_proof",
            Self::UtilityBill => "utility_bill",
            Self::ContractorLicense => "contractor_license",
        }
    }

    /// Parse a category from its wire identifier.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "national_id" => Some(Self::NationalId),
            "proof_of_address" => Some(Self::ProofOfAddress),
            "bank_statement" => Some(Self::BankStatement),
            "income_proof" => Some(Self::IncomeProof),
            "utility_bill" => Some(Self::UtilityBill),
            "contractor_license" => Some(Self::ContractorLicense),
            _ => None,
        }
    }

    /// Human-readable label for listings.
    pub fn label(&self) -> &'static str {
        match self {
            Self::NationalId => "National ID",
            Self::ProofOfAddress => "Proof of Address",
            Self::BankStatement => "Bank Statement",
            Self::IncomeProof => "Proof of Income",
            Self::UtilityBill => "Utility Bill",
            Self::ContractorLicense => "Contractor License",
        }
    }

    /// The MIME types accepted for this category. Identity documents may
    /// be photographed; financial statements must be PDF exports.
    pub fn allowed_mime_types(&self) -> &'static [&'static str] {
        match self {
            Self::NationalId | Self::ProofOfAddress | Self::UtilityBill => {
                &["application/pdf", "image/jpeg", "image/png"]
            }
            Self::BankStatement | Self::IncomeProof => &["application/pdf"],
            Self::ContractorLicense => &["application/pdf", "image/jpeg", "image/png"],
        }
    }
}

impl std::fmt::Display for DocumentCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The profile class of a platform user, which determines the category
/// set their KYC aggregate is computed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileType {
    /// A homeowner financing a solar installation.
    Consumer,
    /// An installer company onboarding to the marketplace.
    Contractor,
}

impl ProfileType {
    /// The categories this profile must submit for verification.
    pub fn required_categories(&self) -> &'static [DocumentCategory] {
        match self {
            Self::Consumer => &[
                DocumentCategory::NationalId,
                DocumentCategory::ProofOfAddress,
                DocumentCategory::BankStatement,
            ],
            Self::Contractor => &[
                DocumentCategory::NationalId,
                DocumentCategory::ContractorLicense,
                DocumentCategory::BankStatement,
            ],
        }
    }

    /// Parse a profile type from its wire identifier.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "consumer" => Some(Self::Consumer),
            "contractor" => Some(Self::Contractor),
            _ => None,
        }
    }
}

impl std::fmt::Display for ProfileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Consumer => f.write_str("consumer"),
            Self::Contractor => f.write_str("contractor"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roundtrip_all_categories() {
        for cat in ALL_CATEGORIES {
            assert_eq!(DocumentCategory::parse(cat.as_str()), Some(cat));
        }
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert_eq!(DocumentCategory::parse("passport_photo"), None);
        assert_eq!(DocumentCategory::parse(""), None);
    }

    #[test]
    fn test_serde_matches_wire_identifier() {
        for cat in ALL_CATEGORIES {
            let json = serde_json::to_string(&cat).unwrap();
            assert_eq!(json, format!("\"{}\"", cat.as_str()));
        }
    }

    #[test]
    fn test_statements_are_pdf_only() {
        assert_eq!(
            DocumentCategory::BankStatement.allowed_mime_types(),
            &["application/pdf"]
        );
        assert!(!DocumentCategory::IncomeProof
            .allowed_mime_types()
            .contains(&"image/jpeg"));
    }

    #[test]
    fn test_every_category_accepts_pdf() {
        for cat in ALL_CATEGORIES {
            assert!(cat.allowed_mime_types().contains(&"application/pdf"));
        }
    }

    #[test]
    fn test_required_categories_per_profile() {
        let consumer = ProfileType::Consumer.required_categories();
        assert!(consumer.contains(&DocumentCategory::NationalId));
        assert!(!consumer.contains(&DocumentCategory::ContractorLicense));

        let contractor = ProfileType::Contractor.required_categories();
        assert!(contractor.contains(&DocumentCategory::ContractorLicense));
    }
}
