//! Chargeback dispute model and request types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A chargeback raised by the card network against a transaction.
///
/// Maps to the `disputes` table. Disputes open with a response deadline; the
/// merchant submits evidence ("open" → "under_review") and the back office
/// records the network's verdict ("won" or "lost").
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Dispute {
    pub id: Uuid,
    pub transaction_id: Uuid,
    pub user_id: Uuid,
    /// Network-issued chargeback reference
    pub reference: String,
    pub amount_paise: i64,
    pub reason: String,
    pub evidence_text: Option<String>,
    /// "open", "under_review", "won" or "lost"
    pub status: String,
    /// Deadline for submitting evidence
    pub due_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Merchant evidence submission on an open dispute.
#[derive(Debug, Deserialize)]
pub struct SubmitEvidenceRequest {
    pub evidence_text: String,
}

/// Admin request to raise a chargeback against a transaction.
#[derive(Debug, Deserialize)]
pub struct CreateDisputeRequest {
    pub transaction_id: Uuid,
    pub reason: String,
    pub due_at: DateTime<Utc>,
}

/// Admin verdict on a disputed transaction.
#[derive(Debug, Deserialize)]
pub struct ResolveDisputeRequest {
    /// "won" or "lost"
    pub outcome: String,
}

/// Response returned for dispute endpoints.
#[derive(Debug, Serialize)]
pub struct DisputeResponse {
    pub id: Uuid,
    pub transaction_id: Uuid,
    pub reference: String,
    pub amount_paise: i64,
    pub reason: String,
    pub evidence_text: Option<String>,
    pub status: String,
    pub due_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<Dispute> for DisputeResponse {
    fn from(d: Dispute) -> Self {
        Self {
            id: d.id,
            transaction_id: d.transaction_id,
            reference: d.reference,
            amount_paise: d.amount_paise,
            reason: d.reason,
            evidence_text: d.evidence_text,
            status: d.status,
            due_at: d.due_at,
            created_at: d.created_at,
        }
    }
}
