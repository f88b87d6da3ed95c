//! Event-bus long polling.
//!
//! Clients poll here for the typed events the dashboard used to broadcast
//! between components in-page. The handler subscribes to the bus, waits up
//! to the requested timeout for an event visible to this session, and
//! returns 204 if none arrives.

use crate::{error::AppError, middleware::auth::SessionContext, state::AppState};
use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;

const DEFAULT_WAIT_SECS: u64 = 25;
const MAX_WAIT_SECS: u64 = 55;

#[derive(Debug, Deserialize)]
pub struct NextEventQuery {
    pub timeout_secs: Option<u64>,
}

/// Wait for the next event addressed to this session's user.
///
/// Merchants see their own events; admins see everyone's. Returns the event
/// as JSON, or 204 No Content when the wait times out.
pub async fn next_event(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Query(query): Query<NextEventQuery>,
) -> Result<Response, AppError> {
    let wait = Duration::from_secs(
        query
            .timeout_secs
            .unwrap_or(DEFAULT_WAIT_SECS)
            .min(MAX_WAIT_SECS),
    );

    let mut rx = state.events.subscribe();

    let next = tokio::time::timeout(wait, async {
        loop {
            match rx.recv().await {
                Ok(event) if session.is_admin() || event.user_id() == session.user_id => {
                    break Some(event);
                }
                Ok(_) => continue,
                // Dropped behind the buffer; keep reading what's left.
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break None,
            }
        }
    })
    .await;

    match next {
        Ok(Some(event)) => Ok(Json(event).into_response()),
        _ => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}
