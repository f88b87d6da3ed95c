//! Settlement batch model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A batch of successful transactions swept to the merchant's bank.
///
/// Maps to the `settlements` table. Totals are the sums over the member
/// transactions, so `net_paise = amount_paise - fee_paise - tax_paise` holds
/// for the batch exactly as it does per transaction. The UTR is the bank's
/// reference for the transfer and is only present once the batch is settled.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Settlement {
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount_paise: i64,
    pub fee_paise: i64,
    pub tax_paise: i64,
    pub net_paise: i64,
    pub transaction_count: i64,
    pub utr: Option<String>,
    /// "processing" until the bank transfer completes, then "settled"
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub settled_at: Option<DateTime<Utc>>,
}

/// Admin request to create a settlement batch for a merchant.
#[derive(Debug, Deserialize)]
pub struct CreateSettlementRequest {
    pub user_id: Uuid,
}

/// Admin request to mark a settlement as settled with its bank reference.
#[derive(Debug, Deserialize)]
pub struct SettleRequest {
    pub utr: String,
}

/// Response returned for settlement endpoints.
#[derive(Debug, Serialize)]
pub struct SettlementResponse {
    pub id: Uuid,
    pub amount_paise: i64,
    pub fee_paise: i64,
    pub tax_paise: i64,
    pub net_paise: i64,
    pub transaction_count: i64,
    pub utr: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub settled_at: Option<DateTime<Utc>>,
}

impl From<Settlement> for SettlementResponse {
    fn from(s: Settlement) -> Self {
        Self {
            id: s.id,
            amount_paise: s.amount_paise,
            fee_paise: s.fee_paise,
            tax_paise: s.tax_paise,
            net_paise: s.net_paise,
            transaction_count: s.transaction_count,
            utr: s.utr,
            status: s.status,
            created_at: s.created_at,
            settled_at: s.settled_at,
        }
    }
}
