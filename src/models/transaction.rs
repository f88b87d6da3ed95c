//! Payment transaction model and API request/response types.
//!
//! This module defines:
//! - `Transaction`: database entity for a customer payment
//! - `CreateTransactionRequest`: request body for recording a payment
//! - `TransactionListQuery`: list filters
//! - `TransactionResponse`: response body returned to clients

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents a transaction record from the database.
///
/// # Database Table
///
/// Maps to the `transactions` table. Each transaction:
/// - Belongs to one merchant (via `user_id`)
/// - Stores amounts in paise (never floats)
/// - Carries the fee/tax/net split computed when it was recorded
/// - Joins at most one settlement batch once successful
///
/// # Amount Split
///
/// `net_paise = amount_paise - fee_paise - tax_paise` always holds; the
/// split is computed by [`crate::services::fees::FeePolicy`] at insert time
/// and never recomputed.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Transaction {
    /// Unique identifier for this transaction
    pub id: Uuid,

    /// Merchant that received this payment
    pub user_id: Uuid,

    /// Merchant-side order reference
    pub order_id: String,

    /// Paying customer's email, if collected at checkout
    pub customer_email: Option<String>,

    /// Paying customer's phone, if collected at checkout
    pub customer_phone: Option<String>,

    /// Gross amount in paise
    pub amount_paise: i64,

    /// Platform fee in paise
    pub fee_paise: i64,

    /// Tax on the fee in paise
    pub tax_paise: i64,

    /// Amount credited to the merchant on success
    pub net_paise: i64,

    /// Total refunded so far; never exceeds `amount_paise`
    pub refunded_paise: i64,

    /// Currency code, currently always "INR"
    pub currency: String,

    /// "upi", "card", "netbanking", "wallet", ...
    pub payment_method: String,

    /// "pending", "success", "failed" or "refunded"
    pub status: String,

    /// Settlement batch this transaction was swept into, if any
    pub settlement_id: Option<Uuid>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// Paise still refundable on this transaction.
    pub fn refundable_paise(&self) -> i64 {
        self.amount_paise - self.refunded_paise
    }
}

/// Request to record a payment transaction.
///
/// # JSON Example
///
/// ```json
/// {
///   "order_id": "ORD-10023",
///   "amount_paise": 125000,
///   "payment_method": "upi",
///   "customer_email": "buyer@example.com"
/// }
/// ```
///
/// Fee, tax and net are computed server-side; the transaction starts out
/// "pending" until the back office confirms or fails it.
#[derive(Debug, Deserialize)]
pub struct CreateTransactionRequest {
    pub order_id: String,
    pub amount_paise: i64,
    pub payment_method: String,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
}

/// Filters accepted by the transaction list endpoint.
///
/// All filters are optional; `limit` defaults to 100 and is capped at 1000.
#[derive(Debug, Deserialize)]
pub struct TransactionListQuery {
    pub status: Option<String>,
    pub payment_method: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
}

/// Response returned for transaction endpoints.
#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    pub id: Uuid,
    pub order_id: String,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub amount_paise: i64,
    pub fee_paise: i64,
    pub tax_paise: i64,
    pub net_paise: i64,
    pub refunded_paise: i64,
    pub currency: String,
    pub payment_method: String,
    pub status: String,
    pub settlement_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<Transaction> for TransactionResponse {
    fn from(t: Transaction) -> Self {
        Self {
            id: t.id,
            order_id: t.order_id,
            customer_email: t.customer_email,
            customer_phone: t.customer_phone,
            amount_paise: t.amount_paise,
            fee_paise: t.fee_paise,
            tax_paise: t.tax_paise,
            net_paise: t.net_paise,
            refunded_paise: t.refunded_paise,
            currency: t.currency,
            payment_method: t.payment_method,
            status: t.status,
            settlement_id: t.settlement_id,
            created_at: t.created_at,
        }
    }
}

/// Request body for the admin status-transition endpoint.
///
/// Only "pending" transactions move; the allowed targets are "success" and
/// "failed".
#[derive(Debug, Deserialize)]
pub struct UpdateTransactionStatusRequest {
    pub status: String,
}
