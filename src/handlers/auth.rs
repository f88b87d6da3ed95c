//! Authentication HTTP handlers.
//!
//! This module implements the session lifecycle endpoints:
//! - POST /api/v1/auth/signup - Create merchant account, open a session
//! - POST /api/v1/auth/signin - Verify credentials, open a session
//! - POST /api/v1/auth/signout - Invalidate the current session
//! - GET  /api/v1/auth/me - Current user for the session

use crate::{
    error::AppError,
    middleware::auth::SessionContext,
    models::user::{SessionResponse, SignInRequest, SignUpRequest, User, UserResponse},
    services::auth_service,
    state::AppState,
};
use axum::{Extension, Json, extract::State, http::StatusCode};

/// Create a merchant account.
///
/// # Endpoint
///
/// `POST /api/v1/auth/signup`
///
/// # Request Body
///
/// ```json
/// {
///   "email": "owner@acme.example",
///   "password": "correct horse battery",
///   "merchant_name": "Acme Retail"
/// }
/// ```
///
/// # Response
///
/// - **Success (201 Created)**: session token plus the new user
/// - **Error (409)**: email already registered
/// - **Error (400)**: malformed email, short password, empty merchant name
pub async fn sign_up(
    State(state): State<AppState>,
    Json(request): Json<SignUpRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), AppError> {
    let session =
        auth_service::sign_up(&state.pool, state.config.session_ttl_hours, request).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// Sign in with email and password.
///
/// Returns 401 `invalid_credentials` for unknown emails and wrong passwords
/// alike.
pub async fn sign_in(
    State(state): State<AppState>,
    Json(request): Json<SignInRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let session =
        auth_service::sign_in(&state.pool, state.config.session_ttl_hours, request).await?;
    Ok(Json(session))
}

/// Invalidate the session backing this request.
pub async fn sign_out(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
) -> Result<StatusCode, AppError> {
    auth_service::sign_out(&state.pool, session.session_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Current user for the authenticated session.
pub async fn me(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
) -> Result<Json<UserResponse>, AppError> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(session.user_id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or(AppError::NotFound("user"))?;

    Ok(Json(user.into()))
}
