//! Settlement view handlers.
//!
//! Merchants see their settlement batches here; batches are created and
//! settled from the admin console.

use crate::{
    error::AppError,
    middleware::auth::SessionContext,
    models::settlement::{Settlement, SettlementResponse},
    state::AppState,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
};
use uuid::Uuid;

/// List the merchant's settlements, newest first.
pub async fn list_settlements(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
) -> Result<Json<Vec<SettlementResponse>>, AppError> {
    let settlements = sqlx::query_as::<_, Settlement>(
        "SELECT * FROM settlements WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(session.user_id)
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(settlements.into_iter().map(Into::into).collect()))
}

/// Get one of the merchant's settlements.
pub async fn get_settlement(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Path(settlement_id): Path<Uuid>,
) -> Result<Json<SettlementResponse>, AppError> {
    let settlement =
        sqlx::query_as::<_, Settlement>("SELECT * FROM settlements WHERE id = $1 AND user_id = $2")
            .bind(settlement_id)
            .bind(session.user_id)
            .fetch_optional(&state.pool)
            .await?
            .ok_or(AppError::NotFound("settlement"))?;

    Ok(Json(settlement.into()))
}
