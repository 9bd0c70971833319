//! Handler for the storage liveness check.

use axum::{extract::State, http::StatusCode};
use tracing::warn;

use crate::state::AppState;

/// Reports whether storage answers.
///
/// # Endpoint
///
/// `GET /ping`
///
/// # Response Codes
///
/// - **200 OK**: storage is reachable
/// - **503 Service Unavailable**: the check failed or timed out
pub async fn ping_handler(State(state): State<AppState>) -> StatusCode {
    match state.shortener.ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            warn!("Storage ping failed: {}", e);
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
