//! Refund HTTP handlers.
//!
//! - GET  /api/v1/refunds - List the merchant's refund requests
//! - POST /api/v1/refunds - Raise a refund against a transaction

use crate::{
    error::AppError,
    middleware::auth::SessionContext,
    models::refund::{CreateRefundRequest, Refund, RefundResponse},
    services::refund_service,
    state::AppState,
};
use axum::{Extension, Json, extract::State, http::StatusCode};

/// List the merchant's refunds, newest first.
pub async fn list_refunds(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
) -> Result<Json<Vec<RefundResponse>>, AppError> {
    let refunds = sqlx::query_as::<_, Refund>(
        "SELECT * FROM refunds WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(session.user_id)
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(refunds.into_iter().map(Into::into).collect()))
}

/// Raise a refund request.
///
/// # Validation
///
/// - Transaction must belong to the merchant and be successful
/// - Amount must be positive and fit the refundable remainder
///   (422 `refund_exceeds_transaction` otherwise)
pub async fn create_refund(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Json(request): Json<CreateRefundRequest>,
) -> Result<(StatusCode, Json<RefundResponse>), AppError> {
    let refund = refund_service::create_refund(&state.pool, session.user_id, request).await?;

    Ok((StatusCode::CREATED, Json(refund.into())))
}
