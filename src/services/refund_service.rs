//! Refund business logic.
//!
//! Refund validation lives here, in one place, so the rule "a refund never
//! exceeds what is still refundable on its transaction" is enforced for
//! every caller and unit-testable without a database. Balance updates use
//! row locks inside a single database transaction.

use uuid::Uuid;

use crate::db::DbPool;
use crate::error::AppError;
use crate::events::{AppEvent, EventBus};
use crate::models::refund::{CreateRefundRequest, Refund};
use crate::models::transaction::Transaction;

const REFUND_METHODS: &[&str] = &["original", "bank_transfer"];

/// Validate a requested refund amount against the refundable remainder.
///
/// # Errors
///
/// - `InvalidRequest`: amount is zero or negative
/// - `RefundExceedsTransaction`: amount exceeds `refundable_paise`
pub fn validate_refund_amount(amount_paise: i64, refundable_paise: i64) -> Result<(), AppError> {
    if amount_paise <= 0 {
        return Err(AppError::InvalidRequest(
            "Refund amount must be positive".to_string(),
        ));
    }
    if amount_paise > refundable_paise {
        return Err(AppError::RefundExceedsTransaction);
    }
    Ok(())
}

/// Raise a refund request against one of the merchant's transactions.
///
/// # Process
///
/// 1. Lock the transaction row (scoped to the requesting merchant)
/// 2. Check the transaction is refundable and the amount fits the remainder
/// 3. Insert the pending refund
///
/// The money does not move here; it moves when the back office processes
/// the request.
pub async fn create_refund(
    pool: &DbPool,
    user_id: Uuid,
    request: CreateRefundRequest,
) -> Result<Refund, AppError> {
    if !REFUND_METHODS.contains(&request.method.as_str()) {
        return Err(AppError::InvalidRequest(format!(
            "Unknown refund method: {}",
            request.method
        )));
    }

    let mut tx = pool.begin().await?;

    let transaction = sqlx::query_as::<_, Transaction>(
        "SELECT * FROM transactions WHERE id = $1 AND user_id = $2 FOR UPDATE",
    )
    .bind(request.transaction_id)
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(AppError::NotFound("transaction"))?;

    if transaction.status != "success" && transaction.status != "refunded" {
        return Err(AppError::InvalidRequest(
            "Only successful transactions can be refunded".to_string(),
        ));
    }

    validate_refund_amount(request.amount_paise, transaction.refundable_paise())?;

    let refund = sqlx::query_as::<_, Refund>(
        r#"
        INSERT INTO refunds (transaction_id, user_id, amount_paise, method, reason, requested_by)
        VALUES ($1, $2, $3, $4, $5, $2)
        RETURNING *
        "#,
    )
    .bind(transaction.id)
    .bind(user_id)
    .bind(request.amount_paise)
    .bind(&request.method)
    .bind(&request.reason)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(refund)
}

/// Back-office decision on a pending refund.
///
/// # Process (decision = "processed")
///
/// 1. Lock the refund; it must still be pending
/// 2. Lock the merchant and debit the refund amount from their balance
/// 3. Lock the transaction, bump `refunded_paise`, and flip its status to
///    "refunded" once fully refunded
/// 4. Mark the refund processed
///
/// All updates commit atomically. "rejected" only flips the refund status.
pub async fn process_refund(
    pool: &DbPool,
    events: &EventBus,
    refund_id: Uuid,
    decision: &str,
) -> Result<Refund, AppError> {
    if decision != "processed" && decision != "rejected" {
        return Err(AppError::InvalidRequest(format!(
            "Unknown refund decision: {decision}"
        )));
    }

    let mut tx = pool.begin().await?;

    let refund = sqlx::query_as::<_, Refund>("SELECT * FROM refunds WHERE id = $1 FOR UPDATE")
        .bind(refund_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::NotFound("refund"))?;

    if refund.status != "pending" {
        return Err(AppError::InvalidRequest(
            "Refund has already been decided".to_string(),
        ));
    }

    if decision == "processed" {
        let balance_paise: i64 =
            sqlx::query_scalar("SELECT balance_paise FROM users WHERE id = $1 FOR UPDATE")
                .bind(refund.user_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(AppError::NotFound("user"))?;

        if balance_paise < refund.amount_paise {
            return Err(AppError::InsufficientBalance);
        }

        sqlx::query(
            "UPDATE users SET balance_paise = balance_paise - $1, updated_at = NOW() WHERE id = $2",
        )
        .bind(refund.amount_paise)
        .bind(refund.user_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE transactions
            SET refunded_paise = refunded_paise + $1,
                status = CASE WHEN refunded_paise + $1 >= amount_paise THEN 'refunded' ELSE status END,
                updated_at = NOW()
            WHERE id = $2
            "#,
        )
        .bind(refund.amount_paise)
        .bind(refund.transaction_id)
        .execute(&mut *tx)
        .await?;
    }

    let refund = sqlx::query_as::<_, Refund>(
        "UPDATE refunds SET status = $1, updated_at = NOW() WHERE id = $2 RETURNING *",
    )
    .bind(decision)
    .bind(refund_id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    events.publish(AppEvent::RefundStatusChanged {
        user_id: refund.user_id,
        refund_id: refund.id,
        status: refund.status.clone(),
    });

    Ok(refund)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refund_within_remainder_is_accepted() {
        assert!(validate_refund_amount(5_000, 10_000).is_ok());
        assert!(validate_refund_amount(10_000, 10_000).is_ok());
    }

    #[test]
    fn test_refund_exceeding_remainder_is_rejected() {
        assert!(matches!(
            validate_refund_amount(10_001, 10_000),
            Err(AppError::RefundExceedsTransaction)
        ));
    }

    #[test]
    fn test_non_positive_refund_is_rejected() {
        assert!(matches!(
            validate_refund_amount(0, 10_000),
            Err(AppError::InvalidRequest(_))
        ));
        assert!(matches!(
            validate_refund_amount(-500, 10_000),
            Err(AppError::InvalidRequest(_))
        ));
    }
}
