//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /{alias}`              - Redirect (public)
//! - `GET  /ping`                 - Storage liveness (public)
//! - `POST /`, `/api/shorten*`, `/api/user/urls` - Session cookie resolved or issued
//! - `GET  /api/internal/stats`   - Trusted `X-Real-IP` only
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Ownership** - `token` cookie resolution on user routes
//! - **Trusted networks** - IP allow-list on internal routes
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::{ping_handler, redirect_handler};
use crate::api::middleware::{ownership, tracing, trusted};
use crate::state::AppState;
use axum::routing::get;
use axum::{Router, middleware};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Constructs the application router with all routes and middleware.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(api_router(state))
}

/// All routes and middleware except path normalization.
pub fn api_router(state: AppState) -> Router {
    let owned = api::routes::owned_routes().route_layer(middleware::from_fn_with_state(
        state.clone(),
        ownership::layer,
    ));

    let internal = api::routes::internal_routes().route_layer(middleware::from_fn_with_state(
        state.clone(),
        trusted::layer,
    ));

    Router::new()
        .route("/ping", get(ping_handler))
        .route("/{alias}", get(redirect_handler))
        .merge(owned)
        .nest("/api/internal", internal)
        .with_state(state)
        .layer(tracing::layer())
}
