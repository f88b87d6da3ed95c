//! Application configuration management.
//!
//! Configuration is loaded from environment variables (with an optional
//! `.env` file) and deserialized into a type-safe struct via the `envy` crate.

use serde::Deserialize;

/// Application configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `DATABASE_URL` (required): PostgreSQL connection string
/// - `SERVER_PORT` (optional): HTTP server port, defaults to 3000
/// - `STORAGE_ROOT` (optional): local directory backing the document store,
///   defaults to `./storage`
/// - `STORAGE_PUBLIC_BASE_URL` (optional): base URL documents are served
///   from, defaults to `http://localhost:3000/storage/`
/// - `URL_SIGNING_SECRET` (required): HMAC key for signed document URLs
/// - `SESSION_TTL_HOURS` (optional): session lifetime, defaults to 24
/// - `FEE_BPS` (optional): transaction fee in basis points, defaults to 200
/// - `TAX_BPS` (optional): tax on the fee in basis points, defaults to 1800
/// - `PAYOUT_FEE_PAISE` (optional): flat payout fee, defaults to 1000 (₹10)
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,

    #[serde(default = "default_port")]
    pub server_port: u16,

    #[serde(default = "default_storage_root")]
    pub storage_root: String,

    #[serde(default = "default_storage_public_base_url")]
    pub storage_public_base_url: String,

    pub url_signing_secret: String,

    #[serde(default = "default_session_ttl_hours")]
    pub session_ttl_hours: i64,

    #[serde(default = "default_fee_bps")]
    pub fee_bps: i64,

    #[serde(default = "default_tax_bps")]
    pub tax_bps: i64,

    #[serde(default = "default_payout_fee_paise")]
    pub payout_fee_paise: i64,
}

fn default_port() -> u16 {
    3000
}

fn default_storage_root() -> String {
    "./storage".to_string()
}

fn default_storage_public_base_url() -> String {
    "http://localhost:3000/storage/".to_string()
}

fn default_session_ttl_hours() -> i64 {
    24
}

/// 2% platform fee on the gross transaction amount.
fn default_fee_bps() -> i64 {
    200
}

/// 18% GST charged on the fee, not on the gross amount.
fn default_tax_bps() -> i64 {
    1800
}

fn default_payout_fee_paise() -> i64 {
    1000
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Attempts to load a `.env` file first (optional), then deserializes the
    /// environment into a `Config`. Field names map to upper-cased variable
    /// names, e.g. `database_url` reads `DATABASE_URL`.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value cannot
    /// be parsed into the expected type.
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>()
    }
}
