//! Transaction HTTP handlers.
//!
//! This module implements the transaction endpoints:
//! - GET  /api/v1/transactions - List with status/method/date filters
//! - GET  /api/v1/transactions/:id - Get one transaction
//! - POST /api/v1/transactions - Record a payment

use crate::{
    error::AppError,
    middleware::auth::SessionContext,
    models::transaction::{
        CreateTransactionRequest, Transaction, TransactionListQuery, TransactionResponse,
    },
    services::transaction_service,
    state::AppState,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

/// List the merchant's transactions, newest first.
///
/// # Endpoint
///
/// `GET /api/v1/transactions?status=success&payment_method=upi&from=...&to=...&limit=50`
///
/// All filters are optional. `limit` defaults to 100, capped at 1000.
pub async fn list_transactions(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Query(query): Query<TransactionListQuery>,
) -> Result<Json<Vec<TransactionResponse>>, AppError> {
    let limit = query.limit.unwrap_or(100).clamp(1, 1000);

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

    Ok(Json(transactions.into_iter().map(Into::into).collect()))
}

/// Get one of the merchant's transactions.
///
/// Returns 404 if the transaction doesn't exist or belongs to another
/// merchant; the query filters on both id and user id so other merchants'
/// transactions are indistinguishable from missing ones.
pub async fn get_transaction(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Path(transaction_id): Path<Uuid>,
) -> Result<Json<TransactionResponse>, AppError> {
    let transaction = sqlx::query_as::<_, Transaction>(
        "SELECT * FROM transactions WHERE id = $1 AND user_id = $2",
    )
    .bind(transaction_id)
    .bind(session.user_id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or(AppError::NotFound("transaction"))?;

    Ok(Json(transaction.into()))
}

/// Record a payment transaction.
///
/// # Request Body
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
/// The fee/tax/net split is computed server-side; the transaction starts
/// out "pending".
pub async fn create_transaction(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Json(request): Json<CreateTransactionRequest>,
) -> Result<(StatusCode, Json<TransactionResponse>), AppError> {
    let transaction =
        transaction_service::record_transaction(&state.pool, &state.fees, session.user_id, request)
            .await?;

    Ok((StatusCode::CREATED, Json(transaction.into())))
}
