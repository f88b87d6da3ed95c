//! Payout business logic.
//!
//! A payout request reserves its gross amount against the merchant's
//! balance (the hold); processing consumes the hold and the balance,
//! failure releases the hold. The "amount must fit the available balance"
//! rule lives here as a pure function so it is testable without a database.

use uuid::Uuid;

use crate::db::DbPool;
use crate::error::AppError;
use crate::events::{AppEvent, EventBus};
use crate::models::payout::Payout;
use crate::models::user::User;

/// Validate a requested payout amount.
///
/// # Errors
///
/// - `InvalidRequest`: amount does not exceed the flat payout fee (which
///   also rejects zero and negative amounts)
/// - `InsufficientBalance`: amount exceeds `available_paise`
///   (balance minus hold)
pub fn validate_payout_amount(
    amount_paise: i64,
    available_paise: i64,
    fee_paise: i64,
) -> Result<(), AppError> {
    if amount_paise <= fee_paise {
        return Err(AppError::InvalidRequest(format!(
            "Payout amount must exceed the {fee_paise} paise processing fee"
        )));
    }
    if amount_paise > available_paise {
        return Err(AppError::InsufficientBalance);
    }
    Ok(())
}

/// Request a withdrawal from the merchant's available balance.
///
/// # Process
///
/// 1. Lock the merchant row
/// 2. Check bank details are on file and the amount fits balance − hold
/// 3. Take a hold for the gross amount
/// 4. Insert the pending payout with the bank details snapshotted
pub async fn create_payout(
    pool: &DbPool,
    payout_fee_paise: i64,
    user_id: Uuid,
    amount_paise: i64,
) -> Result<Payout, AppError> {
    let mut tx = pool.begin().await?;

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1 FOR UPDATE")
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::NotFound("user"))?;

    let (Some(account_number), Some(ifsc), Some(holder)) = (
        user.bank_account_number.clone(),
        user.bank_ifsc.clone(),
        user.bank_account_holder.clone(),
    ) else {
        return Err(AppError::InvalidRequest(
            "Add bank details in settings before requesting a payout".to_string(),
        ));
    };

    validate_payout_amount(amount_paise, user.available_paise(), payout_fee_paise)?;

    sqlx::query("UPDATE users SET hold_paise = hold_paise + $1, updated_at = NOW() WHERE id = $2")
        .bind(amount_paise)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    let payout = sqlx::query_as::<_, Payout>(
        r#"
        INSERT INTO payouts (
            user_id,
            amount_paise,
            fee_paise,
            net_paise,
            bank_account_number,
            bank_ifsc,
            bank_account_holder
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(amount_paise)
    .bind(payout_fee_paise)
    .bind(amount_paise - payout_fee_paise)
    .bind(&account_number)
    .bind(&ifsc)
    .bind(&holder)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(payout)
}

/// Back-office decision on a pending payout.
///
/// "processed" requires the bank's UTR and consumes both the hold and the
/// balance; "failed" releases the hold. Either way the gross amount leaves
/// the hold exactly once.
pub async fn process_payout(
    pool: &DbPool,
    events: &EventBus,
    payout_id: Uuid,
    decision: &str,
    utr: Option<String>,
) -> Result<Payout, AppError> {
    if decision != "processed" && decision != "failed" {
        return Err(AppError::InvalidRequest(format!(
            "Unknown payout decision: {decision}"
        )));
    }

    let mut tx = pool.begin().await?;

    let payout = sqlx::query_as::<_, Payout>("SELECT * FROM payouts WHERE id = $1 FOR UPDATE")
        .bind(payout_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::NotFound("payout"))?;

    if payout.status != "pending" {
        return Err(AppError::InvalidRequest(
            "Payout has already been decided".to_string(),
        ));
    }

    let payout = if decision == "processed" {
        let utr = utr
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| AppError::InvalidRequest("UTR is required to process a payout".to_string()))?;

        sqlx::query(
            r#"
            UPDATE users
            SET balance_paise = balance_paise - $1,
                hold_paise = hold_paise - $1,
                updated_at = NOW()
            WHERE id = $2
            "#,
        )
        .bind(payout.amount_paise)
        .bind(payout.user_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query_as::<_, Payout>(
            "UPDATE payouts SET status = 'processed', utr = $1, updated_at = NOW() WHERE id = $2 RETURNING *",
        )
        .bind(utr.trim())
        .bind(payout_id)
        .fetch_one(&mut *tx)
        .await?
    } else {
        sqlx::query("UPDATE users SET hold_paise = hold_paise - $1, updated_at = NOW() WHERE id = $2")
            .bind(payout.amount_paise)
            .bind(payout.user_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query_as::<_, Payout>(
            "UPDATE payouts SET status = 'failed', updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(payout_id)
        .fetch_one(&mut *tx)
        .await?
    };

    tx.commit().await?;

    events.publish(AppEvent::PayoutStatusChanged {
        user_id: payout.user_id,
        payout_id: payout.id,
        status: payout.status.clone(),
    });

    Ok(payout)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payout_within_available_balance_is_accepted() {
        // balance 100_000, hold 20_000 → available 80_000
        assert!(validate_payout_amount(80_000, 80_000, 1_000).is_ok());
        assert!(validate_payout_amount(50_000, 80_000, 1_000).is_ok());
    }

    #[test]
    fn test_payout_exceeding_available_balance_is_rejected() {
        assert!(matches!(
            validate_payout_amount(80_001, 80_000, 1_000),
            Err(AppError::InsufficientBalance)
        ));
    }

    #[test]
    fn test_payout_not_exceeding_fee_is_rejected() {
        assert!(matches!(
            validate_payout_amount(1_000, 80_000, 1_000),
            Err(AppError::InvalidRequest(_))
        ));
        assert!(matches!(
            validate_payout_amount(0, 80_000, 1_000),
            Err(AppError::InvalidRequest(_))
        ));
        assert!(matches!(
            validate_payout_amount(-5, 80_000, 1_000),
            Err(AppError::InvalidRequest(_))
        ));
    }
}
