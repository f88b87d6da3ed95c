//! Account and session management.
//!
//! Sign-up and sign-in issue bearer session tokens. Tokens and passwords
//! are never stored in clear: the database keeps a SHA-256 hash of the
//! token and a salted SHA-256 hash of the password, following the same
//! hashed-credential-lookup scheme the auth middleware verifies against.

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::db::DbPool;
use crate::error::AppError;
use crate::middleware::auth::sha256_hex;
use crate::models::user::{SessionResponse, SignInRequest, SignUpRequest, User};

/// Generate a 64-hex-character bearer token (32 random bytes).
fn generate_token() -> String {
    let bytes: [u8; 32] = rand::random();
    hex::encode(bytes)
}

/// Generate a 32-hex-character password salt (16 random bytes).
fn generate_salt() -> String {
    let bytes: [u8; 16] = rand::random();
    hex::encode(bytes)
}

/// Salted password hash stored on the user row.
fn hash_password(salt: &str, password: &str) -> String {
    sha256_hex(&format!("{salt}{password}"))
}

/// Reject obviously unusable sign-up data before touching the database.
fn validate_sign_up(request: &SignUpRequest) -> Result<(), AppError> {
    if !request.email.contains('@') || request.email.len() < 3 {
        return Err(AppError::InvalidRequest(
            "A valid email address is required".to_string(),
        ));
    }
    if request.password.len() < 8 {
        return Err(AppError::InvalidRequest(
            "Password must be at least 8 characters".to_string(),
        ));
    }
    if request.merchant_name.trim().is_empty() {
        return Err(AppError::InvalidRequest(
            "Merchant name is required".to_string(),
        ));
    }
    Ok(())
}

/// Create a merchant account and open a session for it.
///
/// # Errors
///
/// - `InvalidRequest`: malformed email, short password, empty merchant name
/// - `EmailTaken`: an account already exists for this email
pub async fn sign_up(
    pool: &DbPool,
    session_ttl_hours: i64,
    request: SignUpRequest,
) -> Result<SessionResponse, AppError> {
    validate_sign_up(&request)?;

    let email = request.email.trim().to_lowercase();

    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
        .bind(&email)
        .fetch_one(pool)
        .await?;
    if exists {
        return Err(AppError::EmailTaken);
    }

    let salt = generate_salt();
    let password_hash = hash_password(&salt, &request.password);

    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (email, password_salt, password_hash, merchant_name)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(&email)
    .bind(&salt)
    .bind(&password_hash)
    .bind(request.merchant_name.trim())
    .fetch_one(pool)
    .await?;

    create_session(pool, session_ttl_hours, user).await
}

/// Verify credentials and open a session.
///
/// # Errors
///
/// `InvalidCredentials` for both unknown emails and wrong passwords, so the
/// response doesn't reveal which accounts exist.
pub async fn sign_in(
    pool: &DbPool,
    session_ttl_hours: i64,
    request: SignInRequest,
) -> Result<SessionResponse, AppError> {
    let email = request.email.trim().to_lowercase();

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(&email)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if hash_password(&user.password_salt, &request.password) != user.password_hash {
        return Err(AppError::InvalidCredentials);
    }

    create_session(pool, session_ttl_hours, user).await
}

/// Issue a fresh token and persist its hash with an expiry.
async fn create_session(
    pool: &DbPool,
    session_ttl_hours: i64,
    user: User,
) -> Result<SessionResponse, AppError> {
    let token = generate_token();
    let token_hash = sha256_hex(&token);
    let expires_at = Utc::now() + Duration::hours(session_ttl_hours);

    sqlx::query("INSERT INTO sessions (user_id, token_hash, expires_at) VALUES ($1, $2, $3)")
        .bind(user.id)
        .bind(&token_hash)
        .bind(expires_at)
        .execute(pool)
        .await?;

    Ok(SessionResponse {
        token,
        user: user.into(),
    })
}

/// Invalidate the session backing the current request.
pub async fn sign_out(pool: &DbPool, session_id: Uuid) -> Result<(), AppError> {
    sqlx::query("DELETE FROM sessions WHERE id = $1")
        .bind(session_id)
        .execute(pool)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign_up_request(email: &str, password: &str, merchant_name: &str) -> SignUpRequest {
        SignUpRequest {
            email: email.to_string(),
            password: password.to_string(),
            merchant_name: merchant_name.to_string(),
        }
    }

    #[test]
    fn test_validate_sign_up_accepts_reasonable_input() {
        assert!(validate_sign_up(&sign_up_request("owner@acme.example", "s3cret-pass", "Acme")).is_ok());
    }

    #[test]
    fn test_validate_sign_up_rejects_bad_input() {
        assert!(validate_sign_up(&sign_up_request("not-an-email", "s3cret-pass", "Acme")).is_err());
        assert!(validate_sign_up(&sign_up_request("owner@acme.example", "short", "Acme")).is_err());
        assert!(validate_sign_up(&sign_up_request("owner@acme.example", "s3cret-pass", "  ")).is_err());
    }

    #[test]
    fn test_hash_password_depends_on_salt() {
        let a = hash_password("salt-a", "password");
        let b = hash_password("salt-b", "password");
        assert_ne!(a, b);
        assert_eq!(a, hash_password("salt-a", "password"));
    }

    #[test]
    fn test_generated_tokens_are_unique_hex() {
        let token = generate_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(token, generate_token());
    }
}
