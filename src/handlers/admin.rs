//! Back-office console handlers.
//!
//! Everything under `/api/v1/admin` runs behind the admin-role middleware:
//! user listing, KYC review, settlement batching, payout/refund processing,
//! transaction lifecycle transitions and chargeback management.

use crate::{
    error::AppError,
    models::dispute::{CreateDisputeRequest, Dispute, DisputeResponse, ResolveDisputeRequest},
    models::kyc::{KycApplication, KycApplicationResponse},
    models::payout::{PayoutResponse, ProcessPayoutRequest},
    models::refund::{ProcessRefundRequest, RefundResponse},
    models::settlement::{CreateSettlementRequest, SettleRequest, SettlementResponse},
    models::transaction::{Transaction, TransactionResponse, UpdateTransactionStatusRequest},
    models::user::{User, UserResponse},
    services::{kyc_service, payout_service, refund_service, settlement_service, transaction_service},
    state::AppState,
    storage,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

/// List every user on the platform, newest first.
pub async fn list_users(
    State(state): State<AppState>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY created_at DESC")
        .fetch_all(&state.pool)
        .await?;

    Ok(Json(users.into_iter().map(Into::into).collect()))
}

#[derive(Debug, Deserialize)]
pub struct KycListQuery {
    pub status: Option<String>,
}

/// List KYC applications, optionally filtered by status.
///
/// The review queue is `?status=submitted`.
pub async fn list_kyc_applications(
    State(state): State<AppState>,
    Query(query): Query<KycListQuery>,
) -> Result<Json<Vec<KycApplicationResponse>>, AppError> {
    let applications = sqlx::query_as::<_, KycApplication>(
        r#"
        SELECT * FROM kyc_applications
        WHERE ($1::text IS NULL OR status = $1)
        ORDER BY created_at ASC
        "#,
    )
    .bind(&query.status)
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(applications.into_iter().map(Into::into).collect()))
}

#[derive(Debug, Deserialize)]
pub struct ReviewKycRequest {
    /// "approved" or "rejected"
    pub decision: String,
    /// Required when rejecting
    pub rejection_reason: Option<String>,
}

/// Approve or reject a submitted application.
///
/// Updates the application, moves the merchant's KYC status to "verified"
/// or "rejected", and broadcasts the change on the event bus.
pub async fn review_kyc_application(
    State(state): State<AppState>,
    Path(application_id): Path<Uuid>,
    Json(request): Json<ReviewKycRequest>,
) -> Result<Json<KycApplicationResponse>, AppError> {
    let application = kyc_service::review(
        &state.pool,
        &state.events,
        application_id,
        &request.decision,
        request.rejection_reason,
    )
    .await?;

    Ok(Json(application.into()))
}

#[derive(Debug, Serialize)]
pub struct SignedUrlResponse {
    pub url: String,
    pub expires_at: DateTime<Utc>,
}

/// Signed, expiring download URL for one document of an application.
///
/// The signature covers the storage key and expiry, so the URL cannot be
/// replayed for a different document or after fifteen minutes.
pub async fn kyc_document_url(
    State(state): State<AppState>,
    Path((application_id, slot)): Path<(Uuid, String)>,
) -> Result<Json<SignedUrlResponse>, AppError> {
    let application = sqlx::query_as::<_, KycApplication>(
        "SELECT * FROM kyc_applications WHERE id = $1",
    )
    .bind(application_id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or(AppError::NotFound("kyc application"))?;

    let key = application
        .documents
        .get(&slot)
        .and_then(|v| v.as_str())
        .ok_or(AppError::NotFound("document"))?;

    let base = Url::parse(&state.config.storage_public_base_url)
        .map_err(storage::StorageError::from)?;
    let expires_at = Utc::now() + Duration::minutes(15);
    let url = storage::signed_url(
        &base,
        key,
        &state.config.url_signing_secret,
        expires_at.timestamp(),
    )?;

    Ok(Json(SignedUrlResponse {
        url: url.into(),
        expires_at,
    }))
}

/// Create a settlement batch from a merchant's eligible transactions.
pub async fn create_settlement(
    State(state): State<AppState>,
    Json(request): Json<CreateSettlementRequest>,
) -> Result<(StatusCode, Json<SettlementResponse>), AppError> {
    let settlement =
        settlement_service::create_settlement(&state.pool, &state.events, request.user_id).await?;

    Ok((StatusCode::CREATED, Json(settlement.into())))
}

/// Record the bank's UTR and mark a settlement as settled.
pub async fn settle_settlement(
    State(state): State<AppState>,
    Path(settlement_id): Path<Uuid>,
    Json(request): Json<SettleRequest>,
) -> Result<Json<SettlementResponse>, AppError> {
    let settlement = settlement_service::mark_settled(&state.pool, settlement_id, &request.utr).await?;

    Ok(Json(settlement.into()))
}

/// Decide a pending payout: processed (with UTR) or failed.
pub async fn process_payout(
    State(state): State<AppState>,
    Path(payout_id): Path<Uuid>,
    Json(request): Json<ProcessPayoutRequest>,
) -> Result<Json<PayoutResponse>, AppError> {
    let payout = payout_service::process_payout(
        &state.pool,
        &state.events,
        payout_id,
        &request.decision,
        request.utr,
    )
    .await?;

    Ok(Json(payout.into()))
}

/// Decide a pending refund: processed or rejected.
pub async fn process_refund(
    State(state): State<AppState>,
    Path(refund_id): Path<Uuid>,
    Json(request): Json<ProcessRefundRequest>,
) -> Result<Json<RefundResponse>, AppError> {
    let refund =
        refund_service::process_refund(&state.pool, &state.events, refund_id, &request.decision)
            .await?;

    Ok(Json(refund.into()))
}

/// Move a pending transaction to success or failed.
pub async fn update_transaction_status(
    State(state): State<AppState>,
    Path(transaction_id): Path<Uuid>,
    Json(request): Json<UpdateTransactionStatusRequest>,
) -> Result<Json<TransactionResponse>, AppError> {
    let transaction =
        transaction_service::transition_status(&state.pool, transaction_id, &request.status)
            .await?;

    Ok(Json(transaction.into()))
}

/// Raise a chargeback dispute against a transaction.
///
/// The disputed amount is the transaction's gross amount; the reference is
/// generated in the network's `CB-XXXXXXXX` shape.
pub async fn create_dispute(
    State(state): State<AppState>,
    Json(request): Json<CreateDisputeRequest>,
) -> Result<(StatusCode, Json<DisputeResponse>), AppError> {
    if request.reason.trim().is_empty() {
        return Err(AppError::InvalidRequest(
            "A dispute reason is required".to_string(),
        ));
    }

    let transaction =
        sqlx::query_as::<_, Transaction>("SELECT * FROM transactions WHERE id = $1")
            .bind(request.transaction_id)
            .fetch_optional(&state.pool)
            .await?
            .ok_or(AppError::NotFound("transaction"))?;

    if transaction.status != "success" && transaction.status != "refunded" {
        return Err(AppError::InvalidRequest(
            "Only successful transactions can be disputed".to_string(),
        ));
    }

    let reference = format!("CB-{}", hex::encode(rand::random::<[u8; 4]>()).to_uppercase());

    let dispute = sqlx::query_as::<_, Dispute>(
        r#"
        INSERT INTO disputes (transaction_id, user_id, reference, amount_paise, reason, due_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(transaction.id)
    .bind(transaction.user_id)
    .bind(&reference)
    .bind(transaction.amount_paise)
    .bind(request.reason.trim())
    .bind(request.due_at)
    .fetch_one(&state.pool)
    .await?;

    Ok((StatusCode::CREATED, Json(dispute.into())))
}

/// Record the network's verdict on a dispute.
pub async fn resolve_dispute(
    State(state): State<AppState>,
    Path(dispute_id): Path<Uuid>,
    Json(request): Json<ResolveDisputeRequest>,
) -> Result<Json<DisputeResponse>, AppError> {
    if request.outcome != "won" && request.outcome != "lost" {
        return Err(AppError::InvalidRequest(format!(
            "Unknown dispute outcome: {}",
            request.outcome
        )));
    }

    let updated = sqlx::query_as::<_, Dispute>(
        r#"
        UPDATE disputes
        SET status = $1, updated_at = NOW()
        WHERE id = $2 AND status IN ('open', 'under_review')
        RETURNING *
        "#,
    )
    .bind(&request.outcome)
    .bind(dispute_id)
    .fetch_optional(&state.pool)
    .await?;

    match updated {
        Some(dispute) => Ok(Json(dispute.into())),
        None => {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM disputes WHERE id = $1)")
                    .bind(dispute_id)
                    .fetch_one(&state.pool)
                    .await?;
            if exists {
                Err(AppError::InvalidRequest(
                    "Dispute has already been resolved".to_string(),
                ))
            } else {
                Err(AppError::NotFound("dispute"))
            }
        }
    }
}
