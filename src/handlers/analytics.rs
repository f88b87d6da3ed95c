//! Dashboard analytics summary.

use crate::{error::AppError, middleware::auth::SessionContext, state::AppState};
use axum::{
    Extension, Json,
    extract::{Query, State},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Optional date range for the summary.
#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

#[derive(Debug, sqlx::FromRow, Serialize)]
struct Totals {
    transaction_count: i64,
    success_count: i64,
    failed_count: i64,
    pending_count: i64,
    refunded_count: i64,
    amount_paise: i64,
    fee_paise: i64,
    tax_paise: i64,
    net_paise: i64,
}

#[derive(Debug, sqlx::FromRow, Serialize)]
struct MethodBreakdown {
    payment_method: String,
    transaction_count: i64,
    amount_paise: i64,
}

/// Summary response: counts, amount totals over successful transactions,
/// success rate, per-method breakdown.
#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    #[serde(flatten)]
    totals: Totals,
    success_rate: f64,
    methods: Vec<MethodBreakdown>,
}

/// Aggregate the merchant's transactions for the dashboard cards.
///
/// # Endpoint
///
/// `GET /api/v1/analytics/summary?from=...&to=...`
///
/// Amount totals cover successful and refunded transactions (money that
/// actually moved); counts cover everything in the range.
pub async fn summary(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<SummaryResponse>, AppError> {
    let totals = sqlx::query_as::<_, Totals>(
        r#"
        SELECT
            COUNT(*) AS transaction_count,
            COUNT(*) FILTER (WHERE status = 'success') AS success_count,
            COUNT(*) FILTER (WHERE status = 'failed') AS failed_count,
            COUNT(*) FILTER (WHERE status = 'pending') AS pending_count,
            COUNT(*) FILTER (WHERE status = 'refunded') AS refunded_count,
            COALESCE(SUM(amount_paise) FILTER (WHERE status IN ('success', 'refunded')), 0)::BIGINT AS amount_paise,
            COALESCE(SUM(fee_paise) FILTER (WHERE status IN ('success', 'refunded')), 0)::BIGINT AS fee_paise,
            COALESCE(SUM(tax_paise) FILTER (WHERE status IN ('success', 'refunded')), 0)::BIGINT AS tax_paise,
            COALESCE(SUM(net_paise) FILTER (WHERE status IN ('success', 'refunded')), 0)::BIGINT AS net_paise
        FROM transactions
        WHERE user_id = $1
          AND ($2::timestamptz IS NULL OR created_at >= $2)
          AND ($3::timestamptz IS NULL OR created_at <= $3)
        "#,
    )
    .bind(session.user_id)
    .bind(query.from)
    .bind(query.to)
    .fetch_one(&state.pool)
    .await?;

    let methods = sqlx::query_as::<_, MethodBreakdown>(
        r#"
        SELECT
            payment_method,
            COUNT(*) AS transaction_count,
            COALESCE(SUM(amount_paise), 0)::BIGINT AS amount_paise
        FROM transactions
        WHERE user_id = $1
          AND ($2::timestamptz IS NULL OR created_at >= $2)
          AND ($3::timestamptz IS NULL OR created_at <= $3)
        GROUP BY payment_method
        ORDER BY amount_paise DESC
        "#,
    )
    .bind(session.user_id)
    .bind(query.from)
    .bind(query.to)
    .fetch_all(&state.pool)
    .await?;

    let success_rate = if totals.transaction_count > 0 {
        totals.success_count as f64 / totals.transaction_count as f64
    } else {
        0.0
    };

    Ok(Json(SummaryResponse {
        totals,
        success_rate,
        methods,
    }))
}
