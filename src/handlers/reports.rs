//! CSV export handlers.

use crate::{
    error::AppError,
    middleware::auth::SessionContext,
    models::transaction::{Transaction, TransactionListQuery},
    services::report_service,
    state::AppState,
};
use axum::{
    Extension,
    extract::{Query, State},
    http::header,
    response::IntoResponse,
};

/// Export the merchant's transactions as a CSV download.
///
/// # Endpoint
///
/// `GET /api/v1/reports/transactions.csv?status=success&from=...&to=...`
///
/// Accepts the same filters as the transaction list. The body is one header
/// line plus one line per transaction, with monetary fields formatted to
/// two decimal places.
pub async fn transactions_csv(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Query(query): Query<TransactionListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let limit = query.limit.unwrap_or(10_000).clamp(1, 100_000);

    let transactions = sqlx::query_as::<_, Transaction>(
        r#"
        SELECT * FROM transactions
        WHERE user_id = $1
          AND ($2::text IS NULL OR status = $2)
          AND ($3::text IS NULL OR payment_method = $3)
          AND ($4::timestamptz IS NULL OR created_at >= $4)
          AND ($5::timestamptz IS NULL OR created_at <= $5)
        ORDER BY created_at DESC
        LIMIT $6
        "#,
    )
    .bind(session.user_id)
    .bind(&query.status)
    .bind(&query.payment_method)
    .bind(query.from)
    .bind(query.to)
    .bind(limit)
    .fetch_all(&state.pool)
    .await?;

    let csv = report_service::transactions_csv(&transactions);

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"transactions.csv\"",
            ),
        ],
        csv,
    ))
}
