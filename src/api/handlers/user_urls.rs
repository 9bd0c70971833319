//! Handlers for the caller's own URLs.

use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::api::dto::user_urls::UserUrlResponse;
use crate::api::middleware::ownership::Owner;
use crate::error::AppError;
use crate::state::AppState;

/// Lists the live URLs the caller has shortened.
///
/// # Endpoint
///
/// `GET /api/user/urls`
///
/// # Responses
///
/// - **200 OK** with `[{"short_url", "original_url"}]`
/// - **204 No Content** if the caller has none
/// - **501 Not Implemented** on backends without per-user listing
pub async fn list_user_urls_handler(
    State(state): State<AppState>,
    Extension(Owner(owner)): Extension<Owner>,
) -> Result<Response, AppError> {
    let urls = state.shortener.list_user_urls(&owner).await?;

    if urls.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    let body: Vec<UserUrlResponse> = urls.into_iter().map(Into::into).collect();
    Ok(Json(body).into_response())
}

/// Schedules deletion of the caller's aliases.
///
/// # Endpoint
///
/// `DELETE /api/user/urls`
///
/// # Request Body
///
/// ```json
/// ["Ab3_x9-Qz", "Zq0-LmN4p"]
/// ```
///
/// Responds **202 Accepted** once the request is queued. Deletion happens in
/// the background; aliases owned by someone else are left untouched.
pub async fn delete_user_urls_handler(
    State(state): State<AppState>,
    Extension(Owner(owner)): Extension<Owner>,
    Json(aliases): Json<Vec<String>>,
) -> Result<StatusCode, AppError> {
    state.shortener.delete_urls(&owner, aliases).await?;
    Ok(StatusCode::ACCEPTED)
}
