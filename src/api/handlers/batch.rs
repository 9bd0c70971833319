//! Handler for batch shortening.

use axum::{Extension, Json, extract::State, http::StatusCode};
use validator::Validate;

use crate::api::dto::batch::{BatchItemRequest, BatchItemResponse};
use crate::api::middleware::ownership::Owner;
use crate::error::AppError;
use crate::state::AppState;

/// Shortens many URLs in one request.
///
/// # Endpoint
///
/// `POST /api/shorten/batch`
///
/// # Request Body
///
/// ```json
/// [
///   { "correlation_id": "1", "original_url": "https://one.example" },
///   { "correlation_id": "2", "original_url": "https://two.example" }
/// ]
/// ```
///
/// # Response
///
/// **201 Created**
///
/// ```json
/// [
///   { "correlation_id": "1", "short_url": "http://localhost:8080/Ab3_x9-Qz" },
///   { "correlation_id": "2", "short_url": "http://localhost:8080/Zq0-LmN4p" }
/// ]
/// ```
///
/// The batch succeeds or fails as a whole; no partial result is returned.
///
/// # Errors
///
/// Returns 400 Bad Request for an empty batch or an invalid URL.
pub async fn shorten_batch_handler(
    State(state): State<AppState>,
    Extension(Owner(owner)): Extension<Owner>,
    Json(items): Json<Vec<BatchItemRequest>>,
) -> Result<(StatusCode, Json<Vec<BatchItemResponse>>), AppError> {
    for item in &items {
        item.validate()?;
    }

    let stored = state
        .shortener
        .store_batch(&owner, items.into_iter().map(Into::into).collect())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(stored.into_iter().map(Into::into).collect()),
    ))
}
