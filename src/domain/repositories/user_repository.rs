//! Repository trait for user identities.

use crate::error::ShortenerError;
use async_trait::async_trait;

/// Storage contract for opaque user identities.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Mints a new user and returns its id.
    ///
    /// # Errors
    ///
    /// Returns an error if storage is unavailable.
    async fn create_user(&self) -> Result<String, ShortenerError>;

    /// Checks that `user_id` exists.
    ///
    /// # Errors
    ///
    /// Returns [`ShortenerError::NotFound`] for unknown ids, distinct from
    /// other storage failures.
    async fn verify_user(&self, user_id: &str) -> Result<(), ShortenerError>;
}
