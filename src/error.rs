//! Error types for the shortening core and the HTTP surface.
//!
//! [`ShortenerError`] is returned by repositories and services. [`AppError`] is
//! what handlers return; it renders as a JSON error body with a matching status.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};

use crate::utils::db_error::is_unique_violation_on;

/// Primary key constraint of the `urls` table.
pub const ALIAS_CONSTRAINT: &str = "urls_pkey";

/// Unique constraint on `urls.original_url`.
pub const ORIGINAL_URL_CONSTRAINT: &str = "urls_original_url_key";

/// Errors produced by storage backends and domain services.
#[derive(Debug, thiserror::Error)]
pub enum ShortenerError {
    /// Alias or user is absent.
    #[error("not found")]
    NotFound,

    /// The original URL was already shortened; `alias` is the existing short alias.
    #[error("url already shortened as {alias}")]
    DuplicateUrl { alias: String },

    /// Generated alias collided with an existing one.
    #[error("short alias already exists")]
    DuplicateAlias,

    /// A buffered batch repeats a URL or contains one already shortened.
    ///
    /// Unlike [`ShortenerError::DuplicateUrl`] this is a hard failure: the
    /// whole flush is rolled back and no alias is reported.
    #[error("batch contains an already shortened url")]
    BatchConflict,

    /// Operation is not supported by the active backend.
    #[error("{0} is not implemented by this storage backend")]
    NotImplemented(&'static str),

    /// Storage could not be reached.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// Token could not be decrypted or authenticated.
    #[error("authentication failed")]
    AuthFailure,

    /// A write was attempted with an empty URL.
    #[error("empty input")]
    EmptyInput,

    /// Random source failed.
    #[error("entropy source failure: {0}")]
    Entropy(String),

    #[error("database error: {0}")]
    Database(sqlx::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for ShortenerError {
    fn from(e: sqlx::Error) -> Self {
        if is_unique_violation_on(&e, ALIAS_CONSTRAINT) {
            return Self::DuplicateAlias;
        }
        // Single inserts resolve this constraint themselves; only batches get here.
        if is_unique_violation_on(&e, ORIGINAL_URL_CONSTRAINT) {
            return Self::BatchConflict;
        }

        match e {
            sqlx::Error::RowNotFound => Self::NotFound,
            sqlx::Error::PoolTimedOut => {
                Self::Unavailable("connection pool timed out".to_string())
            }
            sqlx::Error::PoolClosed => Self::Unavailable("connection pool closed".to_string()),
            sqlx::Error::Io(io) => Self::Unavailable(io.to_string()),
            other => Self::Database(other),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

/// Error payload rendered in HTTP responses.
#[derive(Debug, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

/// HTTP-facing error returned by handlers and middleware.
#[derive(Debug)]
pub enum AppError {
    Validation { message: String, details: Value },
    Unauthorized { message: String, details: Value },
    Forbidden { message: String, details: Value },
    NotFound { message: String, details: Value },
    Conflict { message: String, details: Value },
    NotImplemented { message: String, details: Value },
    Unavailable { message: String, details: Value },
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }
    pub fn unauthorized(message: impl Into<String>, details: Value) -> Self {
        Self::Unauthorized {
            message: message.into(),
            details,
        }
    }
    pub fn forbidden(message: impl Into<String>, details: Value) -> Self {
        Self::Forbidden {
            message: message.into(),
            details,
        }
    }
    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }
    pub fn conflict(message: impl Into<String>, details: Value) -> Self {
        Self::Conflict {
            message: message.into(),
            details,
        }
    }
    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }

    /// Returns the HTTP status this error renders with.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            AppError::Forbidden { .. } => StatusCode::FORBIDDEN,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::NotImplemented { .. } => StatusCode::NOT_IMPLEMENTED,
            AppError::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Converts the error into its serializable payload.
    pub fn to_error_info(self) -> ErrorInfo {
        let (code, message, details) = match self {
            AppError::Validation { message, details } => ("validation_error", message, details),
            AppError::Unauthorized { message, details } => ("unauthorized", message, details),
            AppError::Forbidden { message, details } => ("forbidden", message, details),
            AppError::NotFound { message, details } => ("not_found", message, details),
            AppError::Conflict { message, details } => ("conflict", message, details),
            AppError::NotImplemented { message, details } => {
                ("not_implemented", message, details)
            }
            AppError::Unavailable { message, details } => ("unavailable", message, details),
            AppError::Internal { message, details } => ("internal_error", message, details),
        };

        ErrorInfo {
            code,
            message,
            details,
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let message = match self {
            AppError::Validation { message, .. }
            | AppError::Unauthorized { message, .. }
            | AppError::Forbidden { message, .. }
            | AppError::NotFound { message, .. }
            | AppError::Conflict { message, .. }
            | AppError::NotImplemented { message, .. }
            | AppError::Unavailable { message, .. }
            | AppError::Internal { message, .. } => message,
        };
        f.write_str(message)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            error: self.to_error_info(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<ShortenerError> for AppError {
    fn from(e: ShortenerError) -> Self {
        match e {
            ShortenerError::NotFound => AppError::not_found("Short URL not found", json!({})),
            ShortenerError::DuplicateUrl { alias } => {
                AppError::conflict("URL already shortened", json!({ "alias": alias }))
            }
            ShortenerError::BatchConflict => AppError::conflict(
                "Batch contains an already shortened URL",
                json!({}),
            ),
            ShortenerError::EmptyInput => {
                AppError::bad_request("URL must not be empty", json!({}))
            }
            ShortenerError::AuthFailure => {
                AppError::unauthorized("Unauthorized", json!({ "reason": "invalid token" }))
            }
            ShortenerError::NotImplemented(operation) => AppError::NotImplemented {
                message: "Operation is not supported by the storage backend".to_string(),
                details: json!({ "operation": operation }),
            },
            ShortenerError::Unavailable(reason) => AppError::Unavailable {
                message: "Storage unavailable".to_string(),
                details: json!({ "reason": reason }),
            },
            other => {
                tracing::error!("Request failed: {}", other);
                AppError::internal("Internal server error", json!({}))
            }
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        AppError::bad_request("Validation failed", json!({ "fields": e.to_string() }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ShortenerError::NotFound, StatusCode::NOT_FOUND),
            (
                ShortenerError::DuplicateUrl {
                    alias: "abc".to_string(),
                },
                StatusCode::CONFLICT,
            ),
            (ShortenerError::BatchConflict, StatusCode::CONFLICT),
            (ShortenerError::EmptyInput, StatusCode::BAD_REQUEST),
            (ShortenerError::AuthFailure, StatusCode::UNAUTHORIZED),
            (
                ShortenerError::NotImplemented("flush"),
                StatusCode::NOT_IMPLEMENTED,
            ),
            (
                ShortenerError::Unavailable("down".to_string()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                ShortenerError::DuplicateAlias,
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(AppError::from(err).status(), expected);
        }
    }

    #[test]
    fn test_duplicate_url_details_carry_alias() {
        let info = AppError::from(ShortenerError::DuplicateUrl {
            alias: "X1".to_string(),
        })
        .to_error_info();

        assert_eq!(info.code, "conflict");
        assert_eq!(info.details["alias"], "X1");
    }

    #[test]
    fn test_batch_conflict_carries_no_alias() {
        let info = AppError::from(ShortenerError::BatchConflict).to_error_info();

        assert_eq!(info.code, "conflict");
        assert!(info.details.get("alias").is_none());
    }

    #[test]
    fn test_sqlx_pool_timeout_is_unavailable() {
        let err = ShortenerError::from(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, ShortenerError::Unavailable(_)));
    }

    #[test]
    fn test_sqlx_row_not_found_is_not_found() {
        let err = ShortenerError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, ShortenerError::NotFound));
    }
}
