//! HTTP request handlers (route handlers).
//!
//! Each handler is an async function that:
//! 1. Receives HTTP request data (JSON body, URL params, multipart)
//! 2. Calls into the service layer or queries the database
//! 3. Returns an HTTP response (JSON, CSV, status code)

use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;

/// Back-office console endpoints
pub mod admin;
/// Dashboard analytics summary
pub mod analytics;
/// Sign-up, sign-in, sign-out, current user
pub mod auth;
/// Customer aggregation over transactions
pub mod customers;
/// Chargeback dispute endpoints
pub mod disputes;
/// Event-bus long polling
pub mod events;
/// Service health check
pub mod health;
/// KYC requirements, submission and status
pub mod kyc;
/// Payout request endpoints
pub mod payouts;
/// CSV exports
pub mod reports;
/// Refund request endpoints
pub mod refunds;
/// Settlement views
pub mod settlements;
/// Merchant profile and bank details
pub mod settings;
/// Transaction views and recording
pub mod transactions;

/// Fallback for unmatched paths.
pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": {
                "code": "not_found",
                "message": "No such route"
            }
        })),
    )
}
