//! Merchant user model and auth/settings request types.
//!
//! This module defines:
//! - `User`: database entity for a merchant (or admin) account
//! - Sign-up/sign-in request bodies
//! - Profile and bank-detail update requests
//! - `UserResponse`: the public view returned to clients

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents a user record from the database.
///
/// # Database Table
///
/// Maps to the `users` table. A user is a merchant account (or a back-office
/// admin, distinguished by `role`).
///
/// # Balance Storage
///
/// Balances are stored as `i64` paise to avoid floating-point precision
/// issues: ₹105.50 is stored as 10550. `hold_paise` is the portion of the
/// balance reserved by in-flight payout requests; the amount a merchant can
/// withdraw is `balance_paise - hold_paise`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    /// Unique identifier for this user
    pub id: Uuid,

    /// Sign-in email, unique across the platform
    pub email: String,

    /// Random per-user salt mixed into the password hash
    pub password_salt: String,

    /// SHA-256 hex of salt + password
    pub password_hash: String,

    /// Display name of the merchant business
    pub merchant_name: String,

    /// Optional contact number shown on the settings page
    pub contact_phone: Option<String>,

    /// "merchant" or "admin"; admin unlocks the back-office routes
    pub role: String,

    /// "incomplete", "submitted", "verified" or "rejected"
    pub kyc_status: String,

    /// Current balance in paise, credited from settled transactions
    pub balance_paise: i64,

    /// Paise reserved by pending payout requests
    pub hold_paise: i64,

    /// Payout destination account number, set on the settings page
    pub bank_account_number: Option<String>,

    /// IFSC code of the payout destination branch
    pub bank_ifsc: Option<String>,

    /// Name on the payout destination account
    pub bank_account_holder: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Paise available for withdrawal: balance minus what payouts hold.
    pub fn available_paise(&self) -> i64 {
        self.balance_paise - self.hold_paise
    }

    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

/// Request body for creating a merchant account.
///
/// # JSON Example
///
/// ```json
/// {
///   "email": "owner@acme.example",
///   "password": "correct horse battery",
///   "merchant_name": "Acme Retail"
/// }
/// ```
#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub merchant_name: String,
}

/// Request body for signing in.
#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

/// Profile fields editable from the settings page.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub merchant_name: String,
    pub contact_phone: Option<String>,
}

/// Payout bank details, all required together.
#[derive(Debug, Deserialize)]
pub struct UpdateBankDetailsRequest {
    pub bank_account_number: String,
    pub bank_ifsc: String,
    pub bank_account_holder: String,
}

/// Public view of a user returned to API clients.
///
/// Strips credentials; exposes the derived available balance so clients
/// don't re-implement the hold arithmetic.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub merchant_name: String,
    pub contact_phone: Option<String>,
    pub role: String,
    pub kyc_status: String,
    pub balance_paise: i64,
    pub hold_paise: i64,
    pub available_paise: i64,
    pub bank_account_number: Option<String>,
    pub bank_ifsc: Option<String>,
    pub bank_account_holder: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        let available_paise = user.available_paise();
        Self {
            id: user.id,
            email: user.email,
            merchant_name: user.merchant_name,
            contact_phone: user.contact_phone,
            role: user.role,
            kyc_status: user.kyc_status,
            balance_paise: user.balance_paise,
            hold_paise: user.hold_paise,
            available_paise,
            bank_account_number: user.bank_account_number,
            bank_ifsc: user.bank_ifsc,
            bank_account_holder: user.bank_account_holder,
            created_at: user.created_at,
        }
    }
}

/// Response for sign-up/sign-in: the bearer token plus the user it belongs
/// to. The token is only ever returned here; the database stores its hash.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub token: String,
    pub user: UserResponse,
}
