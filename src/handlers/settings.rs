//! Merchant settings handlers: profile and payout bank details.

use crate::{
    error::AppError,
    middleware::auth::SessionContext,
    models::user::{UpdateBankDetailsRequest, UpdateProfileRequest, User, UserResponse},
    state::AppState,
};
use axum::{Extension, Json, extract::State};

/// Current profile, identical shape to `GET /api/v1/auth/me`.
pub async fn get_profile(
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

/// Update the merchant display name and contact phone.
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<UserResponse>, AppError> {
    if request.merchant_name.trim().is_empty() {
        return Err(AppError::InvalidRequest(
            "Merchant name is required".to_string(),
        ));
    }

    let user = sqlx::query_as::<_, User>(
        r#"
        UPDATE users
        SET merchant_name = $1, contact_phone = $2, updated_at = NOW()
        WHERE id = $3
        RETURNING *
        "#,
    )
    .bind(request.merchant_name.trim())
    .bind(&request.contact_phone)
    .bind(session.user_id)
    .fetch_one(&state.pool)
    .await?;

    Ok(Json(user.into()))
}

/// Validate the payout destination before persisting it.
///
/// Account numbers are 9–18 digits; IFSC codes are 11 characters with a
/// zero in the fifth position (bank code + 0 + branch code).
fn validate_bank_details(request: &UpdateBankDetailsRequest) -> Result<(), AppError> {
    let account = request.bank_account_number.trim();
    if account.len() < 9 || account.len() > 18 || !account.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::InvalidRequest(
            "Account number must be 9 to 18 digits".to_string(),
        ));
    }

    let ifsc = request.bank_ifsc.trim();
    let valid_ifsc = ifsc.len() == 11
        && ifsc.chars().take(4).all(|c| c.is_ascii_uppercase())
        && ifsc.as_bytes()[4] == b'0'
        && ifsc.chars().skip(5).all(|c| c.is_ascii_alphanumeric());
    if !valid_ifsc {
        return Err(AppError::InvalidRequest(
            "IFSC code must look like HDFC0001234".to_string(),
        ));
    }

    if request.bank_account_holder.trim().is_empty() {
        return Err(AppError::InvalidRequest(
            "Account holder name is required".to_string(),
        ));
    }

    Ok(())
}

/// Set the payout bank account.
///
/// Pending payouts keep the details they were requested with; only new
/// payouts pick these up.
pub async fn update_bank_details(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Json(request): Json<UpdateBankDetailsRequest>,
) -> Result<Json<UserResponse>, AppError> {
    validate_bank_details(&request)?;

    let user = sqlx::query_as::<_, User>(
        r#"
        UPDATE users
        SET bank_account_number = $1,
            bank_ifsc = $2,
            bank_account_holder = $3,
            updated_at = NOW()
        WHERE id = $4
        RETURNING *
        "#,
    )
    .bind(request.bank_account_number.trim())
    .bind(request.bank_ifsc.trim())
    .bind(request.bank_account_holder.trim())
    .bind(session.user_id)
    .fetch_one(&state.pool)
    .await?;

    Ok(Json(user.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(account: &str, ifsc: &str, holder: &str) -> UpdateBankDetailsRequest {
        UpdateBankDetailsRequest {
            bank_account_number: account.to_string(),
            bank_ifsc: ifsc.to_string(),
            bank_account_holder: holder.to_string(),
        }
    }

    #[test]
    fn test_valid_bank_details_pass() {
        assert!(validate_bank_details(&request("123456789012", "HDFC0001234", "A. Sharma")).is_ok());
    }

    #[test]
    fn test_bad_account_number_is_rejected() {
        assert!(validate_bank_details(&request("1234", "HDFC0001234", "A. Sharma")).is_err());
        assert!(validate_bank_details(&request("12345678901A", "HDFC0001234", "A. Sharma")).is_err());
    }

    #[test]
    fn test_bad_ifsc_is_rejected() {
        assert!(validate_bank_details(&request("123456789012", "HDFC1001234", "A. Sharma")).is_err());
        assert!(validate_bank_details(&request("123456789012", "HD0001234", "A. Sharma")).is_err());
        assert!(validate_bank_details(&request("123456789012", "hdfc0001234", "A. Sharma")).is_err());
    }

    #[test]
    fn test_blank_holder_is_rejected() {
        assert!(validate_bank_details(&request("123456789012", "HDFC0001234", "  ")).is_err());
    }
}
