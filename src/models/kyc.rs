//! KYC application model and the entity-type → document-slot mapping.
//!
//! This module defines:
//! - `KycApplication`: database entity for a submitted application
//! - The fixed enumeration of business entity types, each mapping to a fixed
//!   list of required/optional document slots
//! - Response types for the requirements and application endpoints

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A submitted KYC application.
///
/// Maps to the `kyc_applications` table. `documents` is a JSON object from
/// document slot name to the storage key the uploaded file lives under.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct KycApplication {
    pub id: Uuid,
    pub user_id: Uuid,
    pub entity_type: String,
    pub business_name: String,
    pub contact_name: String,
    pub contact_email: String,
    pub contact_phone: String,
    /// Slot name → storage key of the uploaded document
    pub documents: serde_json::Value,
    /// "submitted", "approved" or "rejected"
    pub status: String,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One document slot in an entity type's checklist.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DocumentSlot {
    /// Stable slot name, also the multipart part name and storage key leaf
    pub name: &'static str,
    /// Human-readable label surfaced in validation messages
    pub label: &'static str,
    pub required: bool,
}

const fn slot(name: &'static str, label: &'static str, required: bool) -> DocumentSlot {
    DocumentSlot {
        name,
        label,
        required,
    }
}

/// Text fields every application must fill in, regardless of entity type.
pub const REQUIRED_FIELDS: &[(&str, &str)] = &[
    ("business_name", "Business name"),
    ("contact_name", "Contact name"),
    ("contact_email", "Contact email"),
    ("contact_phone", "Contact phone"),
];

const INDIVIDUAL: &[DocumentSlot] = &[
    slot("pan_card", "PAN card", true),
    slot("aadhaar_card", "Aadhaar card", true),
    slot("cancelled_cheque", "Cancelled cheque", true),
    slot("photograph", "Photograph", false),
];

const SOLE_PROPRIETORSHIP: &[DocumentSlot] = &[
    slot("pan_card", "PAN card", true),
    slot("aadhaar_card", "Aadhaar card", true),
    slot("cancelled_cheque", "Cancelled cheque", true),
    slot("shop_establishment_certificate", "Shop & establishment certificate", true),
    slot("gst_certificate", "GST certificate", false),
    slot("bank_statement", "Bank statement", false),
];

const PARTNERSHIP: &[DocumentSlot] = &[
    slot("pan_card", "Firm PAN card", true),
    slot("partnership_deed", "Partnership deed", true),
    slot("gst_certificate", "GST certificate", true),
    slot("cancelled_cheque", "Cancelled cheque", true),
    slot("signatory_aadhaar", "Authorized signatory Aadhaar", true),
    slot("bank_statement", "Bank statement", false),
];

const PRIVATE_LIMITED: &[DocumentSlot] = &[
    slot("pan_card", "Company PAN card", true),
    slot("certificate_of_incorporation", "Certificate of incorporation", true),
    slot("moa_aoa", "MOA & AOA", true),
    slot("board_resolution", "Board resolution", true),
    slot("gst_certificate", "GST certificate", true),
    slot("cancelled_cheque", "Cancelled cheque", true),
];

const LLP: &[DocumentSlot] = &[
    slot("pan_card", "LLP PAN card", true),
    slot("llp_agreement", "LLP agreement", true),
    slot("certificate_of_incorporation", "Certificate of incorporation", true),
    slot("gst_certificate", "GST certificate", true),
    slot("cancelled_cheque", "Cancelled cheque", true),
];

const TRUST: &[DocumentSlot] = &[
    slot("pan_card", "Trust PAN card", true),
    slot("trust_deed", "Trust deed", true),
    slot("cancelled_cheque", "Cancelled cheque", true),
    slot("tax_exemption_certificate", "12A/80G certificate", false),
];

/// The fixed enumeration of business entity types.
pub const ENTITY_TYPES: &[&str] = &[
    "individual",
    "sole_proprietorship",
    "partnership",
    "private_limited",
    "llp",
    "trust",
];

/// Document checklist for an entity type, or `None` if the type is unknown.
pub fn document_slots(entity_type: &str) -> Option<&'static [DocumentSlot]> {
    match entity_type {
        "individual" => Some(INDIVIDUAL),
        "sole_proprietorship" => Some(SOLE_PROPRIETORSHIP),
        "partnership" => Some(PARTNERSHIP),
        "private_limited" => Some(PRIVATE_LIMITED),
        "llp" => Some(LLP),
        "trust" => Some(TRUST),
        _ => None,
    }
}

/// Response for the requirements endpoint: the checklist for one entity type.
#[derive(Debug, Serialize)]
pub struct KycRequirementsResponse {
    pub entity_type: String,
    pub fields: Vec<&'static str>,
    pub documents: &'static [DocumentSlot],
}

/// Response returned for application endpoints.
///
/// Document storage keys stay internal; clients only see which slots were
/// submitted.
#[derive(Debug, Serialize)]
pub struct KycApplicationResponse {
    pub id: Uuid,
    pub entity_type: String,
    pub business_name: String,
    pub contact_name: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub submitted_documents: Vec<String>,
    pub status: String,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<KycApplication> for KycApplicationResponse {
    fn from(app: KycApplication) -> Self {
        let submitted_documents = app
            .documents
            .as_object()
            .map(|m| m.keys().cloned().collect())
            .unwrap_or_default();
        Self {
            id: app.id,
            entity_type: app.entity_type,
            business_name: app.business_name,
            contact_name: app.contact_name,
            contact_email: app.contact_email,
            contact_phone: app.contact_phone,
            submitted_documents,
            status: app.status,
            rejection_reason: app.rejection_reason,
            created_at: app.created_at,
            updated_at: app.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_entity_type_has_slots() {
        for entity_type in ENTITY_TYPES {
            let slots = document_slots(entity_type).unwrap();
            assert!(!slots.is_empty(), "{entity_type} has no document slots");
            assert!(
                slots.iter().any(|s| s.required),
                "{entity_type} has no required documents"
            );
        }
    }

    #[test]
    fn test_unknown_entity_type_has_no_slots() {
        assert!(document_slots("public_limited").is_none());
        assert!(document_slots("").is_none());
    }

    #[test]
    fn test_slot_names_unique_within_entity_type() {
        for entity_type in ENTITY_TYPES {
            let slots = document_slots(entity_type).unwrap();
            let mut names: Vec<&str> = slots.iter().map(|s| s.name).collect();
            names.sort_unstable();
            names.dedup();
            assert_eq!(names.len(), slots.len(), "duplicate slot in {entity_type}");
        }
    }

    #[test]
    fn test_every_entity_type_requires_pan_and_cheque() {
        for entity_type in ENTITY_TYPES {
            let slots = document_slots(entity_type).unwrap();
            for required in ["pan_card", "cancelled_cheque"] {
                assert!(
                    slots.iter().any(|s| s.name == required && s.required),
                    "{entity_type} missing required {required}"
                );
            }
        }
    }
}
