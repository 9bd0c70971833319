//! Repository trait for URL storage.

use crate::domain::entities::{OwnedUrl, PendingDeletion, Stats, UrlRecord};
use crate::error::ShortenerError;
use async_trait::async_trait;

/// Storage contract for shortened URLs.
///
/// Every backend implements the whole trait. Operations a backend cannot
/// support return [`ShortenerError::NotImplemented`] instead of doing nothing.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgStorage`] - PostgreSQL, full feature set
/// - [`crate::infrastructure::persistence::MemoryStorage`] - In-process map
/// - [`crate::infrastructure::persistence::FileStorage`] - Append-only journal
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UrlRepository: Send + Sync {
    /// Looks up a record by alias, including soft-deleted ones.
    ///
    /// # Errors
    ///
    /// Returns [`ShortenerError::NotFound`] if the alias was never stored.
    async fn find(&self, alias: &str) -> Result<UrlRecord, ShortenerError>;

    /// Inserts a record keyed by its alias.
    ///
    /// # Errors
    ///
    /// - [`ShortenerError::DuplicateUrl`] carrying the pre-existing alias when the
    ///   original URL is already stored
    /// - [`ShortenerError::DuplicateAlias`] when the alias is taken
    async fn save(&self, record: UrlRecord) -> Result<(), ShortenerError>;

    /// Appends a record to the insert buffer, flushing it once full.
    async fn buffer_insert(&self, record: UrlRecord) -> Result<(), ShortenerError>;

    /// Writes every buffered record in one transaction.
    ///
    /// The buffer is emptied whether or not the write succeeds.
    async fn flush(&self) -> Result<(), ShortenerError>;

    /// Queues an `(alias, owner)` pair for soft deletion.
    async fn buffer_delete(&self, deletion: PendingDeletion) -> Result<(), ShortenerError>;

    /// Drains the pairs queued so far and marks them deleted in one transaction.
    async fn flush_deletes(&self) -> Result<(), ShortenerError>;

    /// Lists live records owned by `owner_id`, aliases qualified by `base_url`.
    ///
    /// An empty list is not an error.
    async fn list_by_owner(
        &self,
        owner_id: &str,
        base_url: &str,
    ) -> Result<Vec<OwnedUrl>, ShortenerError>;

    /// Liveness check.
    async fn ping(&self) -> Result<(), ShortenerError>;

    /// Counts stored URLs and users.
    async fn stats(&self) -> Result<Stats, ShortenerError>;
}
