//! KYC submission and review logic.
//!
//! Submission is the two-step wizard's final act: validate the contact
//! fields and document checklist for the chosen entity type (naming every
//! missing item), upload each file to the document store under a
//! per-user/per-entity-type key, then insert a single application record
//! referencing the stored keys and flip the merchant's visible status to
//! "submitted".
//!
//! The hosted storage API occasionally reports failure for an upload that
//! actually landed (a duplicate-upload race); an exists check after a failed
//! put tolerates exactly that case. Any other failure aborts the submission
//! and deletes the objects uploaded earlier in it, best-effort, so a failed
//! submission leaves no orphaned documents behind.

use std::collections::HashMap;

use uuid::Uuid;

use crate::db::DbPool;
use crate::error::AppError;
use crate::events::{AppEvent, EventBus};
use crate::models::kyc::{DocumentSlot, KycApplication, REQUIRED_FIELDS, document_slots};
use crate::state::AppState;
use crate::storage::ObjectStore;

/// One file collected by the submission form, keyed by its document slot.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub slot: String,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Parsed multipart submission.
#[derive(Debug, Default)]
pub struct KycSubmission {
    pub entity_type: String,
    pub fields: HashMap<String, String>,
    pub files: Vec<UploadedFile>,
}

/// Storage key a document slot's file is uploaded under.
fn document_key(user_id: Uuid, entity_type: &str, slot: &str) -> String {
    format!("kyc/{user_id}/{entity_type}/{slot}")
}

/// Labels of every required text field and document slot the submission is
/// missing, in checklist order. Empty-valued fields and empty files count
/// as missing.
pub fn missing_items(
    slots: &[DocumentSlot],
    fields: &HashMap<String, String>,
    files: &[UploadedFile],
) -> Vec<String> {
    let mut missing = Vec::new();

    for (name, label) in REQUIRED_FIELDS {
        let filled = fields.get(*name).is_some_and(|v| !v.trim().is_empty());
        if !filled {
            missing.push((*label).to_string());
        }
    }

    for slot in slots.iter().filter(|s| s.required) {
        let provided = files
            .iter()
            .any(|f| f.slot == slot.name && !f.bytes.is_empty());
        if !provided {
            missing.push(slot.label.to_string());
        }
    }

    missing
}

/// Upload every document, tolerating the already-exists false negative.
///
/// Returns the slot → storage-key map for the application record. On a
/// fatal failure the keys uploaded earlier in this submission are deleted
/// best-effort before the error is returned.
async fn upload_documents(
    storage: &dyn ObjectStore,
    user_id: Uuid,
    entity_type: &str,
    files: &[UploadedFile],
) -> Result<serde_json::Map<String, serde_json::Value>, AppError> {
    let mut uploaded = serde_json::Map::new();

    for file in files {
        let key = document_key(user_id, entity_type, &file.slot);
        if let Err(put_err) = storage.put(&key, &file.bytes).await {
            // The storage API sometimes reports failure for an object that
            // landed anyway; an exists check tells those apart.
            let landed = storage.exists(&key).await.unwrap_or(false);
            if !landed {
                tracing::warn!(
                    "kyc upload failed for slot {}: {put_err}; rolling back {} uploads",
                    file.slot,
                    uploaded.len()
                );
                cleanup_uploads(storage, &uploaded).await;
                return Err(put_err.into());
            }
            tracing::debug!("kyc upload for slot {} already present, continuing", file.slot);
        }
        uploaded.insert(file.slot.clone(), serde_json::Value::String(key));
    }

    Ok(uploaded)
}

/// Best-effort deletion of the objects a failed submission uploaded.
async fn cleanup_uploads(
    storage: &dyn ObjectStore,
    uploaded: &serde_json::Map<String, serde_json::Value>,
) {
    for key in uploaded.values().filter_map(|v| v.as_str()) {
        if let Err(e) = storage.delete(key).await {
            tracing::warn!("failed to clean up kyc upload {key}: {e}");
        }
    }
}

/// Submit a KYC application.
///
/// # Errors
///
/// - `InvalidRequest`: unknown entity type or document slot, duplicate slot,
///   or an application already submitted/approved
/// - `KycIncomplete`: required fields or documents missing, named
/// - `Storage`: a document upload failed (after cleanup)
pub async fn submit(
    state: &AppState,
    user_id: Uuid,
    submission: KycSubmission,
) -> Result<KycApplication, AppError> {
    let slots = document_slots(&submission.entity_type).ok_or_else(|| {
        AppError::InvalidRequest(format!(
            "Unknown business entity type: {}",
            submission.entity_type
        ))
    })?;

    let mut seen: Vec<&str> = Vec::new();
    for file in &submission.files {
        if !slots.iter().any(|s| s.name == file.slot) {
            return Err(AppError::InvalidRequest(format!(
                "Unknown document slot for {}: {}",
                submission.entity_type, file.slot
            )));
        }
        if seen.contains(&file.slot.as_str()) {
            return Err(AppError::InvalidRequest(format!(
                "Duplicate document slot: {}",
                file.slot
            )));
        }
        seen.push(file.slot.as_str());
    }

    let kyc_status: String = sqlx::query_scalar("SELECT kyc_status FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or(AppError::NotFound("user"))?;
    if kyc_status == "submitted" || kyc_status == "verified" {
        return Err(AppError::InvalidRequest(
            "A KYC application has already been submitted".to_string(),
        ));
    }

    let missing = missing_items(slots, &submission.fields, &submission.files);
    if !missing.is_empty() {
        return Err(AppError::KycIncomplete(missing));
    }

    let uploaded = upload_documents(
        state.storage.as_ref(),
        user_id,
        &submission.entity_type,
        &submission.files,
    )
    .await?;

    let field = |name: &str| submission.fields.get(name).map(|v| v.trim().to_string());

    // The record insert and status flip share one database transaction; if
    // it fails the uploads are rolled back too.
    let inserted: Result<KycApplication, AppError> = async {
        let mut tx = state.pool.begin().await?;
        let application = sqlx::query_as::<_, KycApplication>(
            r#"
            INSERT INTO kyc_applications (
                user_id,
                entity_type,
                business_name,
                contact_name,
                contact_email,
                contact_phone,
                documents
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(&submission.entity_type)
        .bind(field("business_name"))
        .bind(field("contact_name"))
        .bind(field("contact_email"))
        .bind(field("contact_phone"))
        .bind(serde_json::Value::Object(uploaded.clone()))
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE users SET kyc_status = 'submitted', updated_at = NOW() WHERE id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(application)
    }
    .await;

    let application = match inserted {
        Ok(application) => application,
        Err(e) => {
            cleanup_uploads(state.storage.as_ref(), &uploaded).await;
            return Err(e);
        }
    };

    state.events.publish(AppEvent::KycStatusChanged {
        user_id,
        status: "submitted".to_string(),
    });

    Ok(application)
}

/// Back-office review of a submitted application.
///
/// "approved" verifies the merchant; "rejected" requires a reason and sends
/// them back to the form. Both outcomes are broadcast on the event bus.
pub async fn review(
    pool: &DbPool,
    events: &EventBus,
    application_id: Uuid,
    decision: &str,
    rejection_reason: Option<String>,
) -> Result<KycApplication, AppError> {
    let (app_status, user_status) = match decision {
        "approved" => ("approved", "verified"),
        "rejected" => ("rejected", "rejected"),
        other => {
            return Err(AppError::InvalidRequest(format!(
                "Unknown review decision: {other}"
            )));
        }
    };

    let reason = rejection_reason.filter(|r| !r.trim().is_empty());
    if decision == "rejected" && reason.is_none() {
        return Err(AppError::InvalidRequest(
            "A rejection reason is required".to_string(),
        ));
    }

    let mut tx = pool.begin().await?;

    let application = sqlx::query_as::<_, KycApplication>(
        "SELECT * FROM kyc_applications WHERE id = $1 FOR UPDATE",
    )
    .bind(application_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(AppError::NotFound("kyc application"))?;

    if application.status != "submitted" {
        return Err(AppError::InvalidRequest(
            "Application has already been reviewed".to_string(),
        ));
    }

    let application = sqlx::query_as::<_, KycApplication>(
        r#"
        UPDATE kyc_applications
        SET status = $1, rejection_reason = $2, updated_at = NOW()
        WHERE id = $3
        RETURNING *
        "#,
    )
    .bind(app_status)
    .bind(&reason)
    .bind(application_id)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("UPDATE users SET kyc_status = $1, updated_at = NOW() WHERE id = $2")
        .bind(user_status)
        .bind(application.user_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    events.publish(AppEvent::KycStatusChanged {
        user_id: application.user_id,
        status: user_status.to_string(),
    });

    Ok(application)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryObjectStore;

    fn file(slot: &str, bytes: &[u8]) -> UploadedFile {
        UploadedFile {
            slot: slot.to_string(),
            file_name: format!("{slot}.pdf"),
            bytes: bytes.to_vec(),
        }
    }

    fn filled_fields() -> HashMap<String, String> {
        [
            ("business_name", "Acme Retail"),
            ("contact_name", "A. Sharma"),
            ("contact_email", "owner@acme.example"),
            ("contact_phone", "+91 98765 43210"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    #[test]
    fn test_missing_items_names_fields_and_documents() {
        let slots = document_slots("individual").unwrap();
        let mut fields = filled_fields();
        fields.remove("contact_phone");
        let files = vec![file("pan_card", b"pan")];

        let missing = missing_items(slots, &fields, &files);
        assert_eq!(
            missing,
            vec!["Contact phone", "Aadhaar card", "Cancelled cheque"]
        );
    }

    #[test]
    fn test_empty_file_counts_as_missing() {
        let slots = document_slots("individual").unwrap();
        let files = vec![
            file("pan_card", b"pan"),
            file("aadhaar_card", b""),
            file("cancelled_cheque", b"cheque"),
        ];
        let missing = missing_items(slots, &filled_fields(), &files);
        assert_eq!(missing, vec!["Aadhaar card"]);
    }

    #[test]
    fn test_complete_submission_has_no_missing_items() {
        let slots = document_slots("individual").unwrap();
        let files = vec![
            file("pan_card", b"pan"),
            file("aadhaar_card", b"aadhaar"),
            file("cancelled_cheque", b"cheque"),
        ];
        assert!(missing_items(slots, &filled_fields(), &files).is_empty());
    }

    #[tokio::test]
    async fn test_upload_documents_maps_slots_to_keys() {
        let store = MemoryObjectStore::new();
        let user_id = Uuid::new_v4();
        let files = vec![file("pan_card", b"pan"), file("aadhaar_card", b"aadhaar")];

        let uploaded = upload_documents(&store, user_id, "individual", &files)
            .await
            .unwrap();

        let pan_key = format!("kyc/{user_id}/individual/pan_card");
        assert_eq!(uploaded["pan_card"], serde_json::json!(pan_key));
        assert_eq!(store.object(&pan_key).unwrap(), b"pan");
    }

    #[tokio::test]
    async fn test_upload_tolerates_already_exists_false_negative() {
        let store = MemoryObjectStore::new();
        store.fail_puts_after_storing(true);
        let user_id = Uuid::new_v4();
        let files = vec![file("pan_card", b"pan")];

        // put reports failure, but the exists check finds the object.
        let uploaded = upload_documents(&store, user_id, "individual", &files)
            .await
            .unwrap();
        assert_eq!(uploaded.len(), 1);
    }

    #[tokio::test]
    async fn test_fatal_upload_failure_cleans_up_earlier_uploads() {
        let store = MemoryObjectStore::new();
        let user_id = Uuid::new_v4();
        // The second slot produces an invalid storage key, which fails
        // without storing anything.
        let files = vec![file("pan_card", b"pan"), file("../escape", b"bad")];

        let result = upload_documents(&store, user_id, "individual", &files).await;
        assert!(result.is_err());

        let pan_key = format!("kyc/{user_id}/individual/pan_card");
        assert!(!store.exists(&pan_key).await.unwrap());
    }

    #[test]
    fn test_document_key_is_per_user_and_entity_type() {
        let user_id = Uuid::new_v4();
        let key = document_key(user_id, "partnership", "partnership_deed");
        assert_eq!(key, format!("kyc/{user_id}/partnership/partnership_deed"));
    }
}
