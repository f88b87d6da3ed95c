//! Transaction recording and lifecycle transitions.
//!
//! Recording computes the fee/tax/net split once, at insert time. Status
//! transitions are back-office actions: a pending transaction either
//! succeeds (crediting the merchant's balance with the net amount inside
//! one database transaction) or fails.

use uuid::Uuid;

use crate::db::DbPool;
use crate::error::AppError;
use crate::models::transaction::{CreateTransactionRequest, Transaction};
use crate::services::fees::FeePolicy;

/// Payment methods the checkout supports.
pub const PAYMENT_METHODS: &[&str] = &["upi", "card", "netbanking", "wallet"];

/// Reject malformed transaction requests before computing the split.
fn validate_new_transaction(request: &CreateTransactionRequest) -> Result<(), AppError> {
    if request.order_id.trim().is_empty() {
        return Err(AppError::InvalidRequest(
            "Order id is required".to_string(),
        ));
    }
    if !PAYMENT_METHODS.contains(&request.payment_method.as_str()) {
        return Err(AppError::InvalidRequest(format!(
            "Unknown payment method: {}",
            request.payment_method
        )));
    }
    Ok(())
}

/// Record a payment transaction for a merchant.
///
/// The transaction starts out "pending"; the back office confirms or fails
/// it via [`transition_status`].
pub async fn record_transaction(
    pool: &DbPool,
    fees: &FeePolicy,
    user_id: Uuid,
    request: CreateTransactionRequest,
) -> Result<Transaction, AppError> {
    validate_new_transaction(&request)?;
    let split = fees.split(request.amount_paise)?;

    let transaction = sqlx::query_as::<_, Transaction>(
        r#"
        INSERT INTO transactions (
            user_id,
            order_id,
            customer_email,
            customer_phone,
            amount_paise,
            fee_paise,
            tax_paise,
            net_paise,
            payment_method
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(request.order_id.trim())
    .bind(&request.customer_email)
    .bind(&request.customer_phone)
    .bind(request.amount_paise)
    .bind(split.fee_paise)
    .bind(split.tax_paise)
    .bind(split.net_paise)
    .bind(&request.payment_method)
    .fetch_one(pool)
    .await?;

    Ok(transaction)
}

/// Move a pending transaction to "success" or "failed".
///
/// # Process
///
/// 1. Lock the transaction; only "pending" rows move
/// 2. On success, credit the merchant's balance with the net amount
/// 3. Write the new status
///
/// Both updates commit atomically.
pub async fn transition_status(
    pool: &DbPool,
    transaction_id: Uuid,
    new_status: &str,
) -> Result<Transaction, AppError> {
    if new_status != "success" && new_status != "failed" {
        return Err(AppError::InvalidRequest(format!(
            "Transactions can only move to success or failed, not {new_status}"
        )));
    }

    let mut tx = pool.begin().await?;

    let transaction =
        sqlx::query_as::<_, Transaction>("SELECT * FROM transactions WHERE id = $1 FOR UPDATE")
            .bind(transaction_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(AppError::NotFound("transaction"))?;

    if transaction.status != "pending" {
        return Err(AppError::InvalidRequest(format!(
            "Transaction is already {}",
            transaction.status
        )));
    }

    if new_status == "success" {
        sqlx::query(
            "UPDATE users SET balance_paise = balance_paise + $1, updated_at = NOW() WHERE id = $2",
        )
        .bind(transaction.net_paise)
        .bind(transaction.user_id)
        .execute(&mut *tx)
        .await?;
    }

    let transaction = sqlx::query_as::<_, Transaction>(
        "UPDATE transactions SET status = $1, updated_at = NOW() WHERE id = $2 RETURNING *",
    )
    .bind(new_status)
    .bind(transaction_id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(transaction)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(order_id: &str, payment_method: &str) -> CreateTransactionRequest {
        CreateTransactionRequest {
            order_id: order_id.to_string(),
            amount_paise: 10_000,
            payment_method: payment_method.to_string(),
            customer_email: None,
            customer_phone: None,
        }
    }

    #[test]
    fn test_known_payment_methods_are_accepted() {
        for method in PAYMENT_METHODS {
            assert!(validate_new_transaction(&request("ORD-1", method)).is_ok());
        }
    }

    #[test]
    fn test_unknown_payment_method_is_rejected() {
        assert!(validate_new_transaction(&request("ORD-1", "cheque")).is_err());
    }

    #[test]
    fn test_blank_order_id_is_rejected() {
        assert!(validate_new_transaction(&request("  ", "upi")).is_err());
    }
}
