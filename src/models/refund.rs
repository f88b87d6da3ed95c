//! Refund model and request types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A refund request against a transaction.
///
/// Maps to the `refunds` table. Refunds start "pending" and are moved to
/// "processed" or "rejected" by the back office. The amount is validated
/// against the transaction's refundable remainder at request time.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Refund {
    pub id: Uuid,
    pub transaction_id: Uuid,
    pub user_id: Uuid,
    pub amount_paise: i64,
    /// "original" (back to the payment instrument) or "bank_transfer"
    pub method: String,
    pub reason: Option<String>,
    /// "pending", "processed" or "rejected"
    pub status: String,
    /// User that raised the request
    pub requested_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request to raise a refund.
///
/// # JSON Example
///
/// ```json
/// {
///   "transaction_id": "770e8400-e29b-41d4-a716-446655440002",
///   "amount_paise": 50000,
///   "method": "original",
///   "reason": "customer returned the order"
/// }
/// ```
#[derive(Debug, Deserialize)]
pub struct CreateRefundRequest {
    pub transaction_id: Uuid,
    pub amount_paise: i64,
    #[serde(default = "default_method")]
    pub method: String,
    pub reason: Option<String>,
}

fn default_method() -> String {
    "original".to_string()
}

/// Admin decision on a pending refund.
#[derive(Debug, Deserialize)]
pub struct ProcessRefundRequest {
    /// "processed" or "rejected"
    pub decision: String,
}

/// Response returned for refund endpoints.
#[derive(Debug, Serialize)]
pub struct RefundResponse {
    pub id: Uuid,
    pub transaction_id: Uuid,
    pub amount_paise: i64,
    pub method: String,
    pub reason: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Refund> for RefundResponse {
    fn from(r: Refund) -> Self {
        Self {
            id: r.id,
            transaction_id: r.transaction_id,
            amount_paise: r.amount_paise,
            method: r.method,
            reason: r.reason,
            status: r.status,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}
