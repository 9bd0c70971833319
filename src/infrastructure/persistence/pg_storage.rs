//! PostgreSQL storage backend.

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info};

use crate::domain::entities::{OwnedUrl, PendingDeletion, Stats, UrlRecord};
use crate::domain::repositories::{UrlRepository, UserRepository};
use crate::error::{ORIGINAL_URL_CONSTRAINT, ShortenerError};
use crate::infrastructure::persistence::buffer::{BatchWriter, DeleteBuffer, InsertBuffer};
use crate::utils::db_error::is_unique_violation_on;

/// Upper bound for single statements and `ping`.
pub const STATEMENT_TIMEOUT: Duration = Duration::from_secs(1);

/// Upper bound for a buffer flush transaction.
pub const FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

/// PostgreSQL repository for URLs and users.
///
/// Single statements run directly on the pool. Buffered inserts and
/// soft deletes are written in one transaction per flush, so a failing row
/// rolls back the whole batch.
pub struct PgStorage {
    pool: PgPool,
    insert_buffer: InsertBuffer,
    delete_buffer: DeleteBuffer,
}

impl PgStorage {
    pub fn new(pool: PgPool, insert_capacity: usize, delete_capacity: usize) -> Self {
        Self {
            pool,
            insert_buffer: InsertBuffer::new(insert_capacity),
            delete_buffer: DeleteBuffer::new(delete_capacity),
        }
    }

    /// Applies the embedded schema migrations.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Database migrations applied");
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

async fn within<T, F>(limit: Duration, fut: F) -> Result<T, ShortenerError>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result.map_err(ShortenerError::from),
        Err(_) => Err(ShortenerError::Unavailable(format!(
            "database did not answer within {:?}",
            limit
        ))),
    }
}

#[async_trait]
impl BatchWriter for PgStorage {
    async fn insert_batch(&self, batch: &[UrlRecord]) -> Result<(), ShortenerError> {
        within(FLUSH_TIMEOUT, async {
            let mut tx = self.pool.begin().await?;

            for record in batch {
                sqlx::query(
                    r#"
                    INSERT INTO urls (short_alias, correlation_id, original_url, owner_id)
                    VALUES ($1, $2, $3, $4)
                    "#,
                )
                .bind(&record.short_alias)
                .bind(&record.correlation_id)
                .bind(&record.original_url)
                .bind(&record.owner_id)
                .execute(&mut *tx)
                .await?;
            }

            tx.commit().await
        })
        .await?;

        debug!(records = batch.len(), "Insert batch committed");
        Ok(())
    }

    async fn mark_deleted(&self, batch: &[PendingDeletion]) -> Result<(), ShortenerError> {
        within(FLUSH_TIMEOUT, async {
            let mut tx = self.pool.begin().await?;

            for deletion in batch {
                sqlx::query(
                    r#"
                    UPDATE urls SET is_deleted = TRUE
                    WHERE short_alias = $1 AND owner_id = $2
                    "#,
                )
                .bind(&deletion.short_alias)
                .bind(&deletion.owner_id)
                .execute(&mut *tx)
                .await?;
            }

            tx.commit().await
        })
        .await?;

        debug!(deletions = batch.len(), "Delete batch committed");
        Ok(())
    }
}

#[async_trait]
impl UrlRepository for PgStorage {
    async fn find(&self, alias: &str) -> Result<UrlRecord, ShortenerError> {
        let row = within(
            STATEMENT_TIMEOUT,
            sqlx::query(
                r#"
                SELECT short_alias, correlation_id, original_url, owner_id, is_deleted
                FROM urls
                WHERE short_alias = $1
                "#,
            )
            .bind(alias)
            .fetch_optional(&self.pool),
        )
        .await?
        .ok_or(ShortenerError::NotFound)?;

        Ok(UrlRecord {
            short_alias: row.try_get("short_alias")?,
            correlation_id: row.try_get("correlation_id")?,
            original_url: row.try_get("original_url")?,
            owner_id: row.try_get("owner_id")?,
            is_deleted: row.try_get("is_deleted")?,
        })
    }

    async fn save(&self, record: UrlRecord) -> Result<(), ShortenerError> {
        let inserted = tokio::time::timeout(
            STATEMENT_TIMEOUT,
            sqlx::query(
                r#"
                INSERT INTO urls (short_alias, correlation_id, original_url, owner_id)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(&record.short_alias)
            .bind(&record.correlation_id)
            .bind(&record.original_url)
            .bind(&record.owner_id)
            .execute(&self.pool),
        )
        .await
        .map_err(|_| ShortenerError::Unavailable("insert timed out".to_string()))?;

        match inserted {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation_on(&e, ORIGINAL_URL_CONSTRAINT) => {
                let alias: String = within(
                    STATEMENT_TIMEOUT,
                    sqlx::query_scalar("SELECT short_alias FROM urls WHERE original_url = $1")
                        .bind(&record.original_url)
                        .fetch_one(&self.pool),
                )
                .await?;

                Err(ShortenerError::DuplicateUrl { alias })
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn buffer_insert(&self, record: UrlRecord) -> Result<(), ShortenerError> {
        self.insert_buffer.push(record, self).await
    }

    async fn flush(&self) -> Result<(), ShortenerError> {
        self.insert_buffer.flush(self).await
    }

    async fn buffer_delete(&self, deletion: PendingDeletion) -> Result<(), ShortenerError> {
        self.delete_buffer.push(deletion, self).await
    }

    async fn flush_deletes(&self) -> Result<(), ShortenerError> {
        self.delete_buffer.flush(self).await
    }

    async fn list_by_owner(
        &self,
        owner_id: &str,
        base_url: &str,
    ) -> Result<Vec<OwnedUrl>, ShortenerError> {
        let rows = within(
            STATEMENT_TIMEOUT,
            sqlx::query(
                r#"
                SELECT short_alias, original_url
                FROM urls
                WHERE owner_id = $1 AND is_deleted = FALSE
                ORDER BY created_at
                "#,
            )
            .bind(owner_id)
            .fetch_all(&self.pool),
        )
        .await?;

        let base_url = base_url.trim_end_matches('/');
        rows.into_iter()
            .map(|row| -> Result<OwnedUrl, ShortenerError> {
                let alias: String = row.try_get("short_alias")?;
                Ok(OwnedUrl {
                    short_url: format!("{}/{}", base_url, alias),
                    original_url: row.try_get("original_url")?,
                })
            })
            .collect()
    }

    async fn ping(&self) -> Result<(), ShortenerError> {
        within(
            STATEMENT_TIMEOUT,
            sqlx::query("SELECT 1").execute(&self.pool),
        )
        .await?;
        Ok(())
    }

    async fn stats(&self) -> Result<Stats, ShortenerError> {
        let (urls, users): (i64, i64) = within(
            STATEMENT_TIMEOUT,
            sqlx::query_as(
                "SELECT (SELECT COUNT(*) FROM urls), (SELECT COUNT(*) FROM users)",
            )
            .fetch_one(&self.pool),
        )
        .await?;

        Ok(Stats { urls, users })
    }
}

#[async_trait]
impl UserRepository for PgStorage {
    async fn create_user(&self) -> Result<String, ShortenerError> {
        within(
            STATEMENT_TIMEOUT,
            sqlx::query_scalar("INSERT INTO users DEFAULT VALUES RETURNING id::text")
                .fetch_one(&self.pool),
        )
        .await
    }

    async fn verify_user(&self, user_id: &str) -> Result<(), ShortenerError> {
        let exists: bool = within(
            STATEMENT_TIMEOUT,
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE id::text = $1)")
                .bind(user_id)
                .fetch_one(&self.pool),
        )
        .await?;

        if exists {
            Ok(())
        } else {
            Err(ShortenerError::NotFound)
        }
    }
}
