//! Customer aggregation over transactions.
//!
//! The customers page is derived data: transactions grouped by customer
//! email, with contact URIs the client can hand straight to `mailto:` /
//! `tel:` actions.

use crate::{error::AppError, middleware::auth::SessionContext, state::AppState};
use axum::{Extension, Json, extract::State};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, sqlx::FromRow)]
struct CustomerRow {
    customer_email: String,
    customer_phone: Option<String>,
    transaction_count: i64,
    total_amount_paise: i64,
    last_seen_at: DateTime<Utc>,
}

/// One customer as seen through the merchant's transactions.
#[derive(Debug, Serialize)]
pub struct CustomerResponse {
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub transaction_count: i64,
    pub total_amount_paise: i64,
    pub last_seen_at: DateTime<Utc>,
    /// `mailto:` URI for the contact action
    pub mailto_uri: String,
    /// `tel:` URI, present when a phone number was collected
    pub tel_uri: Option<String>,
}

impl From<CustomerRow> for CustomerResponse {
    fn from(row: CustomerRow) -> Self {
        let mailto_uri = format!("mailto:{}", row.customer_email);
        let tel_uri = row
            .customer_phone
            .as_ref()
            .map(|phone| format!("tel:{}", phone.replace(' ', "")));
        Self {
            customer_email: row.customer_email,
            customer_phone: row.customer_phone,
            transaction_count: row.transaction_count,
            total_amount_paise: row.total_amount_paise,
            last_seen_at: row.last_seen_at,
            mailto_uri,
            tel_uri,
        }
    }
}

/// List customers by recency of their last transaction.
pub async fn list_customers(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
) -> Result<Json<Vec<CustomerResponse>>, AppError> {
    let rows = sqlx::query_as::<_, CustomerRow>(
        r#"
        SELECT
            customer_email,
            MAX(customer_phone) AS customer_phone,
            COUNT(*) AS transaction_count,
            COALESCE(SUM(amount_paise), 0)::BIGINT AS total_amount_paise,
            MAX(created_at) AS last_seen_at
        FROM transactions
        WHERE user_id = $1 AND customer_email IS NOT NULL
        GROUP BY customer_email
        ORDER BY last_seen_at DESC
        LIMIT 200
        "#,
    )
    .bind(session.user_id)
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(rows.into_iter().map(Into::into).collect()))
}
