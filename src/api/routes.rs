//! API route configuration.

use crate::api::handlers::{
    delete_user_urls_handler, list_user_urls_handler, shorten_batch_handler,
    shorten_json_handler, shorten_text_handler, stats_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// Routes acting on behalf of a user, wrapped by
/// [`crate::api::middleware::ownership`].
///
/// # Endpoints
///
/// - `POST   /`                   - Shorten a URL sent as plain text
/// - `POST   /api/shorten`        - Shorten a URL sent as JSON
/// - `POST   /api/shorten/batch`  - Shorten many URLs
/// - `GET    /api/user/urls`      - List the caller's URLs
/// - `DELETE /api/user/urls`      - Delete the caller's URLs
pub fn owned_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(shorten_text_handler))
        .route("/api/shorten", post(shorten_json_handler))
        .route("/api/shorten/batch", post(shorten_batch_handler))
        .route(
            "/api/user/urls",
            get(list_user_urls_handler).delete(delete_user_urls_handler),
        )
}

/// Routes for trusted callers only, wrapped by
/// [`crate::api::middleware::trusted`].
///
/// # Endpoints
///
/// - `GET /stats` - URL and user counts
pub fn internal_routes() -> Router<AppState> {
    Router::new().route("/stats", get(stats_handler))
}
