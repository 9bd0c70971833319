//! Handlers for single-URL shortening.

use axum::{Extension, Json, extract::State, http::StatusCode};
use serde_json::json;
use validator::Validate;

use crate::api::dto::shorten::{ShortenRequest, ShortenResponse};
use crate::api::middleware::ownership::Owner;
use crate::application::services::Stored;
use crate::error::AppError;
use crate::state::AppState;

fn status_for(stored: &Stored) -> StatusCode {
    if stored.is_conflict() {
        StatusCode::CONFLICT
    } else {
        StatusCode::CREATED
    }
}

/// Shortens a URL sent as the raw request body.
///
/// # Endpoint
///
/// `POST /`
///
/// # Responses
///
/// - **201 Created** with the new short URL as plain text
/// - **409 Conflict** with the existing short URL if the URL was already shortened
/// - **400 Bad Request** if the body is empty or not a URL
pub async fn shorten_text_handler(
    State(state): State<AppState>,
    Extension(Owner(owner)): Extension<Owner>,
    body: String,
) -> Result<(StatusCode, String), AppError> {
    let original_url = body.trim();

    if original_url.is_empty() {
        return Err(AppError::bad_request(
            "Request body must contain a URL",
            json!({}),
        ));
    }

    url::Url::parse(original_url).map_err(|e| {
        AppError::bad_request("Invalid URL format", json!({ "reason": e.to_string() }))
    })?;

    let stored = state.shortener.store(original_url, &owner).await?;

    Ok((status_for(&stored), stored.short_url().to_string()))
}

/// Shortens a URL sent as JSON.
///
/// # Endpoint
///
/// `POST /api/shorten`
///
/// # Request Body
///
/// ```json
/// { "url": "https://example.com/some/long/path" }
/// ```
///
/// # Response
///
/// ```json
/// { "result": "http://localhost:8080/Ab3_x9-Qz" }
/// ```
///
/// Status is **201 Created**, or **409 Conflict** when the URL was already
/// shortened (the existing short URL is returned).
///
/// # Errors
///
/// Returns 400 Bad Request if validation fails.
pub async fn shorten_json_handler(
    State(state): State<AppState>,
    Extension(Owner(owner)): Extension<Owner>,
    Json(payload): Json<ShortenRequest>,
) -> Result<(StatusCode, Json<ShortenResponse>), AppError> {
    payload.validate()?;

    let stored = state.shortener.store(&payload.url, &owner).await?;

    Ok((
        status_for(&stored),
        Json(ShortenResponse {
            result: stored.short_url().to_string(),
        }),
    ))
}
