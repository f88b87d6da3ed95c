//! Payout HTTP handlers.
//!
//! - GET  /api/v1/payouts - List the merchant's payout requests
//! - POST /api/v1/payouts - Withdraw from the available balance

use crate::{
    error::AppError,
    middleware::auth::SessionContext,
    models::payout::{CreatePayoutRequest, Payout, PayoutResponse},
    services::payout_service,
    state::AppState,
};
use axum::{Extension, Json, extract::State, http::StatusCode};

/// List the merchant's payouts, newest first.
pub async fn list_payouts(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
) -> Result<Json<Vec<PayoutResponse>>, AppError> {
    let payouts = sqlx::query_as::<_, Payout>(
        "SELECT * FROM payouts WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(session.user_id)
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(payouts.into_iter().map(Into::into).collect()))
}

/// Request a payout to the merchant's bank account.
///
/// # Validation
///
/// - Bank details must be on file (settings page)
/// - Amount must exceed the flat processing fee
/// - Amount must fit the available balance, balance − hold
///   (422 `insufficient_balance` otherwise)
///
/// On success the gross amount is held against the balance until the back
/// office processes or fails the payout.
pub async fn create_payout(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Json(request): Json<CreatePayoutRequest>,
) -> Result<(StatusCode, Json<PayoutResponse>), AppError> {
    let payout = payout_service::create_payout(
        &state.pool,
        state.config.payout_fee_paise,
        session.user_id,
        request.amount_paise,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(payout.into())))
}
