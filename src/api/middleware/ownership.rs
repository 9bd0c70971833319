//! Session ownership middleware.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderValue, header},
    middleware::Next,
    response::Response,
};
use tracing::error;

use crate::{error::AppError, state::AppState};

/// Name of the cookie carrying the sealed user id.
pub const TOKEN_COOKIE: &str = "token";

/// The user on whose behalf a request runs, inserted as a request extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Owner(pub String);

/// Resolves the caller to a user before the handler runs.
///
/// # Flow
///
/// 1. Read the `token` cookie
/// 2. Open it and check that the user exists
/// 3. If the cookie is missing, does not open, or names an unknown user,
///    mint a new user and attach `Set-Cookie: token=<hex>; Path=/; HttpOnly`
///    to the response
/// 4. Insert [`Owner`] into the request extensions
///
/// # Errors
///
/// Returns `500 Internal Server Error` if storage fails while verifying or
/// creating the user.
///
/// # Example
///
/// ```rust,ignore
/// let owned = Router::new()
///     .route("/api/user/urls", get(list_user_urls_handler))
///     .route_layer(middleware::from_fn_with_state(state.clone(), ownership::layer));
/// ```
pub async fn layer(
    State(st): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = token_from_headers(req.headers());

    let identity = st.credentials.resolve(token.as_deref()).await?;
    req.extensions_mut().insert(Owner(identity.user_id));

    let mut response = next.run(req).await;

    if let Some(token) = identity.issued_token {
        match HeaderValue::from_str(&format!("{TOKEN_COOKIE}={token}; Path=/; HttpOnly")) {
            Ok(cookie) => {
                response.headers_mut().append(header::SET_COOKIE, cookie);
            }
            Err(e) => error!("Failed to build session cookie: {}", e),
        }
    }

    Ok(response)
}

/// Extracts the session token from the `Cookie` headers.
fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == TOKEN_COOKIE)
        .map(|(_, value)| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; token=abc123; lang=en"),
        );

        assert_eq!(token_from_headers(&headers).as_deref(), Some("abc123"));
    }

    #[test]
    fn test_token_missing() {
        let mut headers = HeaderMap::new();
        assert_eq!(token_from_headers(&headers), None);

        headers.insert(header::COOKIE, HeaderValue::from_static("tokens=nope"));
        assert_eq!(token_from_headers(&headers), None);
    }
}
