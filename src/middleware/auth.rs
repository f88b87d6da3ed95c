//! Session authentication middleware.
//!
//! Protected routes run [`session_middleware`], which:
//! 1. Extracts the bearer token from the Authorization header
//! 2. Hashes it and looks up a live session joined to its user
//! 3. Injects a [`SessionContext`] into the request extensions
//! 4. Rejects missing/expired sessions with HTTP 401
//!
//! Admin routes additionally run [`require_admin`], which reads the injected
//! context and rejects non-admin sessions with HTTP 403. The SPA's route
//! guards (redirect to `/auth`, admin notice page) map to these two status
//! codes.

use crate::{error::AppError, state::AppState};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Authentication context attached to authenticated requests.
///
/// Handlers extract this with `Extension<SessionContext>` to scope database
/// queries to the signed-in merchant.
#[derive(Debug, Clone)]
pub struct SessionContext {
    /// Session row backing this request, used by sign-out
    pub session_id: Uuid,

    /// Signed-in user; every merchant-scoped query filters on this
    pub user_id: Uuid,

    /// Merchant display name
    pub merchant_name: String,

    /// "merchant" or "admin"
    pub role: String,
}

impl SessionContext {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

/// SHA-256 hex digest, used for session tokens and salted passwords.
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// Row shape for the session-to-user join below.
#[derive(sqlx::FromRow)]
struct SessionRow {
    session_id: Uuid,
    user_id: Uuid,
    merchant_name: String,
    role: String,
}

/// Session authentication middleware function.
///
/// # Flow
///
/// 1. Extract `Authorization: Bearer <token>` header
/// 2. Hash the token with SHA-256 (tokens are never stored in clear)
/// 3. Look up an unexpired session with that hash, joined to its user
/// 4. If found: inject [`SessionContext`], call the next handler
/// 5. If not: return 401 Unauthorized
pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::AuthRequired)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AppError::AuthRequired)?;

    let token_hash = sha256_hex(token);

    let row = sqlx::query_as::<_, SessionRow>(
        r#"
        SELECT s.id AS session_id, u.id AS user_id, u.merchant_name, u.role
        FROM sessions s
        JOIN users u ON u.id = s.user_id
        WHERE s.token_hash = $1 AND s.expires_at > NOW()
        "#,
    )
    .bind(&token_hash)
    .fetch_optional(&state.pool)
    .await?
    .ok_or(AppError::AuthRequired)?;

    let context = SessionContext {
        session_id: row.session_id,
        user_id: row.user_id,
        merchant_name: row.merchant_name,
        role: row.role,
    };

    request.extensions_mut().insert(context);

    Ok(next.run(request).await)
}

/// Admin role check, layered inside the session middleware on `/admin`
/// routes.
pub async fn require_admin(request: Request, next: Next) -> Result<Response, AppError> {
    let context = request
        .extensions()
        .get::<SessionContext>()
        .ok_or(AppError::AuthRequired)?;

    if !context.is_admin() {
        return Err(AppError::AdminOnly);
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Extension, Router, body::Body, http::StatusCode, middleware, routing::get};
    use tower::ServiceExt;

    fn context(role: &str) -> SessionContext {
        SessionContext {
            session_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            merchant_name: "Acme Retail".to_string(),
            role: role.to_string(),
        }
    }

    fn admin_router(ctx: SessionContext) -> Router {
        Router::new()
            .route("/api/v1/admin/users", get(|| async { "ok" }))
            .route_layer(middleware::from_fn(require_admin))
            .layer(Extension(ctx))
    }

    #[tokio::test]
    async fn test_admin_route_rejects_merchant_session() {
        let response = admin_router(context("merchant"))
            .oneshot(
                axum::http::Request::builder()
                    .uri("/api/v1/admin/users")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_admin_route_allows_admin_session() {
        let response = admin_router(context("admin"))
            .oneshot(
                axum::http::Request::builder()
                    .uri("/api/v1/admin/users")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_admin_route_without_session_context_is_unauthorized() {
        let router = Router::new()
            .route("/api/v1/admin/users", get(|| async { "ok" }))
            .route_layer(middleware::from_fn(require_admin));

        let response = router
            .oneshot(
                axum::http::Request::builder()
                    .uri("/api/v1/admin/users")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_sha256_hex_is_stable() {
        assert_eq!(
            sha256_hex("token"),
            "3c469e9d6c5875d37a43f353d4f88e61fcf812c66eee3457465a40b0da4153e0"
        );
    }
}
