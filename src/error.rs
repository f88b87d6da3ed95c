//! Error types and HTTP error response handling.
//!
//! This module defines all application errors and how they are converted
//! into HTTP responses with appropriate status codes and JSON bodies.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::storage::StorageError;

/// Application-wide error type.
///
/// Each variant maps to a specific HTTP status code and a stable machine
/// error code.
///
/// # Error Categories
///
/// - **Database/Storage Errors**: failures talking to PostgreSQL or the
///   document store (details hidden from clients)
/// - **Authentication Errors**: missing/expired sessions, bad credentials,
///   non-admin sessions on admin routes
/// - **Resource Errors**: requested rows that don't exist or belong to a
///   different merchant
/// - **Business Rule Errors**: refund/payout/KYC validation failures
/// - **Validation Errors**: malformed request data
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Database operation failed (connection error, query error).
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Document store operation failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// No valid session token on a protected route.
    ///
    /// The SPA redirected to `/auth` here; the API returns 401 and leaves
    /// navigation to the client.
    #[error("Authentication required")]
    AuthRequired,

    /// Sign-in with an unknown email or wrong password.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Authenticated but non-admin session on an `/admin` route.
    #[error("Administrator access required")]
    AdminOnly,

    /// Requested resource does not exist or belongs to another merchant.
    ///
    /// Carries the resource name so the message reads "transaction not
    /// found", "payout not found", etc.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Sign-up with an email that already has an account.
    #[error("An account with this email already exists")]
    EmailTaken,

    /// Payout amount exceeds available balance (balance minus hold).
    #[error("Insufficient funds: amount exceeds available balance")]
    InsufficientBalance,

    /// Refund amount exceeds what is still refundable on the transaction.
    #[error("Refund amount exceeds the refundable transaction amount")]
    RefundExceedsTransaction,

    /// KYC submission is missing required fields or documents.
    ///
    /// The Vec names every missing item so the client can surface them all
    /// at once.
    #[error("KYC submission incomplete")]
    KycIncomplete(Vec<String>),

    /// Request body or parameters are invalid.
    #[error("Invalid request")]
    InvalidRequest(String),
}

/// Convert AppError into an HTTP response.
///
/// Handlers return `Result<T, AppError>` and errors become JSON bodies of
/// the form:
///
/// ```json
/// {
///   "error": {
///     "code": "error_type",
///     "message": "Human-readable error message"
///   }
/// }
/// ```
///
/// `KycIncomplete` additionally carries a `missing` array naming each absent
/// field or document slot.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::AuthRequired => (StatusCode::UNAUTHORIZED, "auth_required", self.to_string()),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "invalid_credentials",
                self.to_string(),
            ),
            AppError::AdminOnly => (StatusCode::FORBIDDEN, "admin_only", self.to_string()),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found", self.to_string()),
            AppError::EmailTaken => (StatusCode::CONFLICT, "email_taken", self.to_string()),
            AppError::InsufficientBalance => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "insufficient_balance",
                self.to_string(),
            ),
            AppError::RefundExceedsTransaction => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "refund_exceeds_transaction",
                self.to_string(),
            ),
            AppError::KycIncomplete(missing) => {
                let body = Json(json!({
                    "error": {
                        "code": "kyc_incomplete",
                        "message": format!("Missing required items: {}", missing.join(", ")),
                        "missing": missing,
                    }
                }));
                return (StatusCode::UNPROCESSABLE_ENTITY, body).into_response();
            }
            AppError::InvalidRequest(ref msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", msg.clone())
            }
            AppError::Database(ref e) => {
                tracing::error!("database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
            AppError::Storage(ref e) => {
                tracing::error!("storage error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "storage_error",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
