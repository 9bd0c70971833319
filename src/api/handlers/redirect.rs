//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use tracing::debug;

use crate::error::AppError;
use crate::state::AppState;

/// Redirects an alias to its original URL.
///
/// # Endpoint
///
/// `GET /{alias}`
///
/// # Responses
///
/// - **307 Temporary Redirect** to the original URL
/// - **410 Gone** if the owner deleted the alias
/// - **404 Not Found** if the alias was never stored
pub async fn redirect_handler(
    Path(alias): Path<String>,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    let record = state.shortener.find(&alias).await?;

    if record.is_deleted {
        debug!(alias = %alias, "Alias is deleted");
        return Ok(StatusCode::GONE.into_response());
    }

    Ok(Redirect::temporary(&record.original_url).into_response())
}
