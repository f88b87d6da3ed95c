//! Settlement batching logic.
//!
//! A settlement sweeps every eligible transaction (successful and not yet
//! settled) for one merchant into a batch whose totals carry the same
//! amount/fee/tax/net split as the members. Batch creation locks the member
//! rows and commits atomically, so a transaction can never land in two
//! batches.

use uuid::Uuid;

use crate::db::DbPool;
use crate::error::AppError;
use crate::events::{AppEvent, EventBus};
use crate::models::settlement::Settlement;

/// Amount columns of an eligible transaction, as locked for batching.
#[derive(Debug, sqlx::FromRow)]
pub struct EligibleTransaction {
    pub id: Uuid,
    pub amount_paise: i64,
    pub fee_paise: i64,
    pub tax_paise: i64,
    pub net_paise: i64,
}

/// Summed totals for a settlement batch.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct BatchTotals {
    pub amount_paise: i64,
    pub fee_paise: i64,
    pub tax_paise: i64,
    pub net_paise: i64,
    pub transaction_count: i64,
}

/// Sum the member transactions of a batch.
pub fn batch_totals(rows: &[EligibleTransaction]) -> BatchTotals {
    let mut totals = BatchTotals::default();
    for row in rows {
        totals.amount_paise += row.amount_paise;
        totals.fee_paise += row.fee_paise;
        totals.tax_paise += row.tax_paise;
        totals.net_paise += row.net_paise;
        totals.transaction_count += 1;
    }
    totals
}

/// Create a settlement batch from all eligible transactions of a merchant.
///
/// # Process
///
/// 1. Lock every successful, unsettled transaction for the merchant
/// 2. Sum the batch totals
/// 3. Insert the settlement and stamp its id onto the members
///
/// # Errors
///
/// `InvalidRequest` if the merchant has nothing to settle.
pub async fn create_settlement(
    pool: &DbPool,
    events: &EventBus,
    user_id: Uuid,
) -> Result<Settlement, AppError> {
    let mut tx = pool.begin().await?;

    let eligible = sqlx::query_as::<_, EligibleTransaction>(
        r#"
        SELECT id, amount_paise, fee_paise, tax_paise, net_paise
        FROM transactions
        WHERE user_id = $1 AND status = 'success' AND settlement_id IS NULL
        FOR UPDATE
        "#,
    )
    .bind(user_id)
    .fetch_all(&mut *tx)
    .await?;

    if eligible.is_empty() {
        return Err(AppError::InvalidRequest(
            "No settleable transactions for this merchant".to_string(),
        ));
    }

    let totals = batch_totals(&eligible);

    let settlement = sqlx::query_as::<_, Settlement>(
        r#"
        INSERT INTO settlements (
            user_id,
            amount_paise,
            fee_paise,
            tax_paise,
            net_paise,
            transaction_count
        )
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(totals.amount_paise)
    .bind(totals.fee_paise)
    .bind(totals.tax_paise)
    .bind(totals.net_paise)
    .bind(totals.transaction_count)
    .fetch_one(&mut *tx)
    .await?;

    let member_ids: Vec<Uuid> = eligible.iter().map(|t| t.id).collect();
    sqlx::query("UPDATE transactions SET settlement_id = $1, updated_at = NOW() WHERE id = ANY($2)")
        .bind(settlement.id)
        .bind(&member_ids)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    events.publish(AppEvent::SettlementCreated {
        user_id,
        settlement_id: settlement.id,
    });

    Ok(settlement)
}

/// Record the bank's UTR and mark a processing settlement as settled.
pub async fn mark_settled(
    pool: &DbPool,
    settlement_id: Uuid,
    utr: &str,
) -> Result<Settlement, AppError> {
    let utr = utr.trim();
    if utr.is_empty() {
        return Err(AppError::InvalidRequest("UTR is required".to_string()));
    }

    let mut tx = pool.begin().await?;

    let settlement =
        sqlx::query_as::<_, Settlement>("SELECT * FROM settlements WHERE id = $1 FOR UPDATE")
            .bind(settlement_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(AppError::NotFound("settlement"))?;

    if settlement.status != "processing" {
        return Err(AppError::InvalidRequest(
            "Settlement has already been settled".to_string(),
        ));
    }

    let settlement = sqlx::query_as::<_, Settlement>(
        r#"
        UPDATE settlements
        SET status = 'settled', utr = $1, settled_at = NOW()
        WHERE id = $2
        RETURNING *
        "#,
    )
    .bind(utr)
    .bind(settlement_id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(settlement)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eligible(amount: i64, fee: i64, tax: i64) -> EligibleTransaction {
        EligibleTransaction {
            id: Uuid::new_v4(),
            amount_paise: amount,
            fee_paise: fee,
            tax_paise: tax,
            net_paise: amount - fee - tax,
        }
    }

    #[test]
    fn test_batch_totals_sum_members() {
        let rows = vec![
            eligible(100_000, 2_000, 360),
            eligible(50_000, 1_000, 180),
            eligible(25_000, 500, 90),
        ];
        let totals = batch_totals(&rows);
        assert_eq!(totals.amount_paise, 175_000);
        assert_eq!(totals.fee_paise, 3_500);
        assert_eq!(totals.tax_paise, 630);
        assert_eq!(totals.transaction_count, 3);
    }

    #[test]
    fn test_batch_net_equals_amount_minus_fee_minus_tax() {
        let rows = vec![
            eligible(100_000, 2_000, 360),
            eligible(77_700, 1_554, 279),
        ];
        let totals = batch_totals(&rows);
        assert_eq!(
            totals.net_paise,
            totals.amount_paise - totals.fee_paise - totals.tax_paise
        );
    }

    #[test]
    fn test_empty_batch_totals_are_zero() {
        assert_eq!(batch_totals(&[]), BatchTotals::default());
    }
}
