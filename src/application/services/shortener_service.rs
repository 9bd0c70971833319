//! URL shortening service.

use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use crate::domain::deletion_worker::{DeletionQueue, DeletionRequest};
use crate::domain::entities::{BatchShortUrl, BatchUrl, OwnedUrl, Stats, UrlRecord};
use crate::domain::repositories::UrlRepository;
use crate::error::ShortenerError;
use crate::utils::alias_generator::AliasGenerator;

/// Outcome of [`ShortenerService::store`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stored {
    /// A new record was written.
    Created(String),
    /// The URL was already shortened; carries the existing short URL.
    Existing(String),
}

impl Stored {
    /// Fully-qualified short URL in either case.
    pub fn short_url(&self) -> &str {
        match self {
            Self::Created(url) | Self::Existing(url) => url,
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Existing(_))
    }
}

/// Orchestrates alias generation and storage.
///
/// Holds no durable state of its own; everything durable lives in the
/// repository.
pub struct ShortenerService<R: UrlRepository + ?Sized> {
    repository: Arc<R>,
    generator: Box<dyn AliasGenerator>,
    base_url: String,
    deletions: DeletionQueue,
    /// Held from the first buffered record of a batch to its final flush, so
    /// the insert buffer only ever holds one caller's records.
    batch_lock: Mutex<()>,
}

impl<R: UrlRepository + ?Sized> ShortenerService<R> {
    /// Creates a new shortening service.
    ///
    /// # Arguments
    ///
    /// - `repository` - storage backend
    /// - `generator` - alias source
    /// - `base_url` - prefix used to qualify aliases, trailing slash ignored
    /// - `deletions` - queue consumed by the deletion worker
    pub fn new(
        repository: Arc<R>,
        generator: Box<dyn AliasGenerator>,
        base_url: impl Into<String>,
        deletions: DeletionQueue,
    ) -> Self {
        Self {
            repository,
            generator,
            base_url: base_url.into(),
            deletions,
            batch_lock: Mutex::new(()),
        }
    }

    /// Qualifies `alias` with the configured base URL.
    pub fn short_url(&self, alias: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), alias)
    }

    /// Looks up an alias. Soft-deleted records are returned with `is_deleted` set.
    pub async fn find(&self, alias: &str) -> Result<UrlRecord, ShortenerError> {
        self.repository.find(alias).await
    }

    /// Shortens `original_url` on behalf of `owner_id`.
    ///
    /// If the URL was shortened before, by anyone, the existing short URL is
    /// returned as [`Stored::Existing`] and nothing is written.
    ///
    /// # Errors
    ///
    /// - [`ShortenerError::EmptyInput`] for a blank URL
    /// - [`ShortenerError::DuplicateAlias`] if the generated alias is taken
    /// - Generator and storage failures
    pub async fn store(&self, original_url: &str, owner_id: &str) -> Result<Stored, ShortenerError> {
        if original_url.trim().is_empty() {
            return Err(ShortenerError::EmptyInput);
        }

        let alias = self.generator.generate()?;
        let record = UrlRecord::new(original_url, alias.as_str(), owner_id);

        match self.repository.save(record).await {
            Ok(()) => Ok(Stored::Created(self.short_url(&alias))),
            Err(ShortenerError::DuplicateUrl { alias: existing }) => {
                debug!(alias = %existing, "URL already shortened");
                Ok(Stored::Existing(self.short_url(&existing)))
            }
            Err(e) => Err(e),
        }
    }

    /// Shortens every item through the insert buffer, then flushes it.
    ///
    /// Aliases for the whole batch are generated before anything is
    /// buffered, so a generator failure writes nothing. A batch larger than
    /// the buffer capacity triggers intermediate flushes; if a later flush
    /// fails, earlier chunks stay committed even though an error is returned.
    ///
    /// Batches run one at a time. A failed flush discards only the records
    /// of the batch that caused it, and `Ok` is returned only after every
    /// record of this batch was committed.
    ///
    /// # Errors
    ///
    /// - [`ShortenerError::EmptyInput`] for an empty batch or a blank URL
    /// - Generator, buffering and flush failures
    pub async fn store_batch(
        &self,
        owner_id: &str,
        items: Vec<BatchUrl>,
    ) -> Result<Vec<BatchShortUrl>, ShortenerError> {
        if items.is_empty() {
            return Err(ShortenerError::EmptyInput);
        }

        let records = items
            .into_iter()
            .map(|item| {
                if item.original_url.trim().is_empty() {
                    return Err(ShortenerError::EmptyInput);
                }
                let alias = self.generator.generate()?;
                Ok(UrlRecord::new(item.original_url, alias, owner_id)
                    .with_correlation_id(item.correlation_id))
            })
            .collect::<Result<Vec<_>, ShortenerError>>()?;

        let _batch = self.batch_lock.lock().await;

        let mut output = Vec::with_capacity(records.len());
        for record in records {
            output.push(BatchShortUrl {
                correlation_id: record.correlation_id.clone(),
                short_url: self.short_url(&record.short_alias),
            });
            self.repository.buffer_insert(record).await?;
        }

        self.repository.flush().await?;
        debug!(records = output.len(), "Batch stored");

        Ok(output)
    }

    /// Live URLs owned by `owner_id`. An empty list is not an error.
    pub async fn list_user_urls(&self, owner_id: &str) -> Result<Vec<OwnedUrl>, ShortenerError> {
        self.repository
            .list_by_owner(owner_id, &self.base_url)
            .await
    }

    /// Schedules soft deletion of `aliases` owned by `owner_id`.
    ///
    /// Returns once the request is queued. Aliases the owner does not own are
    /// ignored by the storage layer, and flush failures are only logged.
    pub async fn delete_urls(
        &self,
        owner_id: &str,
        aliases: Vec<String>,
    ) -> Result<(), ShortenerError> {
        if aliases.is_empty() {
            return Ok(());
        }

        self.deletions
            .submit(DeletionRequest {
                owner_id: owner_id.to_string(),
                aliases,
            })
            .await
    }

    pub async fn ping(&self) -> Result<(), ShortenerError> {
        self.repository.ping().await
    }

    pub async fn stats(&self) -> Result<Stats, ShortenerError> {
        self.repository.stats().await
    }
}
