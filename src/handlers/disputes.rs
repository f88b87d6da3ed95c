//! Dispute HTTP handlers.
//!
//! Chargebacks are raised by the back office; merchants list them and
//! submit evidence before the deadline.

use crate::{
    error::AppError,
    middleware::auth::SessionContext,
    models::dispute::{Dispute, DisputeResponse, SubmitEvidenceRequest},
    state::AppState,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
};
use uuid::Uuid;

/// List the merchant's disputes, newest first.
pub async fn list_disputes(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
) -> Result<Json<Vec<DisputeResponse>>, AppError> {
    let disputes = sqlx::query_as::<_, Dispute>(
        "SELECT * FROM disputes WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(session.user_id)
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(disputes.into_iter().map(Into::into).collect()))
}

/// Get one of the merchant's disputes.
pub async fn get_dispute(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Path(dispute_id): Path<Uuid>,
) -> Result<Json<DisputeResponse>, AppError> {
    let dispute =
        sqlx::query_as::<_, Dispute>("SELECT * FROM disputes WHERE id = $1 AND user_id = $2")
            .bind(dispute_id)
            .bind(session.user_id)
            .fetch_optional(&state.pool)
            .await?
            .ok_or(AppError::NotFound("dispute"))?;

    Ok(Json(dispute.into()))
}

/// Submit evidence on an open dispute, moving it under review.
///
/// Evidence can only be submitted while the dispute is "open"; later
/// submissions are rejected rather than overwriting what the network
/// already has.
pub async fn submit_evidence(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Path(dispute_id): Path<Uuid>,
    Json(request): Json<SubmitEvidenceRequest>,
) -> Result<Json<DisputeResponse>, AppError> {
    if request.evidence_text.trim().is_empty() {
        return Err(AppError::InvalidRequest(
            "Evidence text is required".to_string(),
        ));
    }

    let updated = sqlx::query_as::<_, Dispute>(
        r#"
        UPDATE disputes
        SET evidence_text = $1, status = 'under_review', updated_at = NOW()
        WHERE id = $2 AND user_id = $3 AND status = 'open'
        RETURNING *
        "#,
    )
    .bind(request.evidence_text.trim())
    .bind(dispute_id)
    .bind(session.user_id)
    .fetch_optional(&state.pool)
    .await?;

    match updated {
        Some(dispute) => Ok(Json(dispute.into())),
        None => {
            // Distinguish a missing dispute from one past its evidence window.
            let exists: bool = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM disputes WHERE id = $1 AND user_id = $2)",
            )
            .bind(dispute_id)
            .bind(session.user_id)
            .fetch_one(&state.pool)
            .await?;

            if exists {
                Err(AppError::InvalidRequest(
                    "Evidence can only be submitted on open disputes".to_string(),
                ))
            } else {
                Err(AppError::NotFound("dispute"))
            }
        }
    }
}
