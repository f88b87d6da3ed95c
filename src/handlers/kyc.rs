//! KYC HTTP handlers.
//!
//! The submission wizard's two steps map to:
//! - GET  /api/v1/kyc/requirements/:entity_type - document checklist
//! - POST /api/v1/kyc - multipart submission (fields + one file per slot)
//! - GET  /api/v1/kyc - the merchant's latest application

use crate::{
    error::AppError,
    middleware::auth::SessionContext,
    models::kyc::{
        KycApplication, KycApplicationResponse, KycRequirementsResponse, REQUIRED_FIELDS,
        document_slots,
    },
    services::kyc_service::{self, KycSubmission, UploadedFile},
    state::AppState,
};
use axum::{
    Extension, Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
};

/// Document checklist and required fields for one entity type.
///
/// # Response (200 OK)
///
/// ```json
/// {
///   "entity_type": "partnership",
///   "fields": ["business_name", "contact_name", "contact_email", "contact_phone"],
///   "documents": [
///     { "name": "pan_card", "label": "Firm PAN card", "required": true },
///     { "name": "bank_statement", "label": "Bank statement", "required": false }
///   ]
/// }
/// ```
pub async fn requirements(
    Path(entity_type): Path<String>,
) -> Result<Json<KycRequirementsResponse>, AppError> {
    let documents = document_slots(&entity_type).ok_or(AppError::NotFound("entity type"))?;

    Ok(Json(KycRequirementsResponse {
        entity_type,
        fields: REQUIRED_FIELDS.iter().map(|(name, _)| *name).collect(),
        documents,
    }))
}

/// The merchant's latest application, or 404 before any submission.
pub async fn get_application(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
) -> Result<Json<KycApplicationResponse>, AppError> {
    let application = sqlx::query_as::<_, KycApplication>(
        "SELECT * FROM kyc_applications WHERE user_id = $1 ORDER BY created_at DESC LIMIT 1",
    )
    .bind(session.user_id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or(AppError::NotFound("kyc application"))?;

    Ok(Json(application.into()))
}

/// Submit a KYC application.
///
/// # Request
///
/// `multipart/form-data` with text parts (`entity_type`, `business_name`,
/// `contact_name`, `contact_email`, `contact_phone`) and one file part per
/// document slot, named after the slot.
///
/// # Response
///
/// - **Success (201 Created)**: the recorded application; the merchant's
///   KYC status is now "submitted"
/// - **Error (422 kyc_incomplete)**: required fields/documents missing,
///   each named in the `missing` array
/// - **Error (400)**: unknown entity type or document slot
pub async fn submit_application(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<KycApplicationResponse>), AppError> {
    let mut submission = KycSubmission::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidRequest(format!("Malformed multipart body: {e}")))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if let Some(file_name) = field.file_name().map(str::to_string) {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::InvalidRequest(format!("Failed to read upload: {e}")))?;
            submission.files.push(UploadedFile {
                slot: name,
                file_name,
                bytes: bytes.to_vec(),
            });
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| AppError::InvalidRequest(format!("Failed to read field: {e}")))?;
            if name == "entity_type" {
                submission.entity_type = value;
            } else {
                submission.fields.insert(name, value);
            }
        }
    }

    let application = kyc_service::submit(&state, session.user_id, submission).await?;

    Ok((StatusCode::CREATED, Json(application.into())))
}
