//! Payout model and request types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A merchant-initiated withdrawal to their bank account.
///
/// Maps to the `payouts` table. The bank details are snapshotted from the
/// user's settings at request time, so later edits don't redirect an
/// in-flight payout. While "pending", the gross amount is held against the
/// merchant's balance.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Payout {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Gross amount deducted from the balance
    pub amount_paise: i64,
    /// Flat processing fee
    pub fee_paise: i64,
    /// Amount actually transferred: amount minus fee
    pub net_paise: i64,
    pub bank_account_number: String,
    pub bank_ifsc: String,
    pub bank_account_holder: String,
    /// Bank reference, present once processed
    pub utr: Option<String>,
    /// "pending", "processed" or "failed"
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request to withdraw from the available balance.
#[derive(Debug, Deserialize)]
pub struct CreatePayoutRequest {
    pub amount_paise: i64,
}

/// Admin decision on a pending payout.
#[derive(Debug, Deserialize)]
pub struct ProcessPayoutRequest {
    /// "processed" or "failed"
    pub decision: String,
    /// Bank reference, required when the decision is "processed"
    pub utr: Option<String>,
}

/// Response returned for payout endpoints.
#[derive(Debug, Serialize)]
pub struct PayoutResponse {
    pub id: Uuid,
    pub amount_paise: i64,
    pub fee_paise: i64,
    pub net_paise: i64,
    pub bank_account_number: String,
    pub bank_ifsc: String,
    pub bank_account_holder: String,
    pub utr: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Payout> for PayoutResponse {
    fn from(p: Payout) -> Self {
        Self {
            id: p.id,
            amount_paise: p.amount_paise,
            fee_paise: p.fee_paise,
            net_paise: p.net_paise,
            bank_account_number: p.bank_account_number,
            bank_ifsc: p.bank_ifsc,
            bank_account_holder: p.bank_account_holder,
            utr: p.utr,
            status: p.status,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}
