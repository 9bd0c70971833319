//! PostgreSQL backend tests. Need a database reachable through `DATABASE_URL`.

use sqlx::PgPool;
use url_shortener::domain::entities::{PendingDeletion, UrlRecord};
use url_shortener::domain::repositories::{UrlRepository, UserRepository};
use url_shortener::error::ShortenerError;
use url_shortener::infrastructure::persistence::PgStorage;

fn storage(pool: PgPool) -> PgStorage {
    PgStorage::new(pool, 1000, 1024)
}

#[sqlx::test(migrations = "./migrations")]
async fn test_save_and_find(pool: PgPool) {
    let storage = storage(pool);

    storage
        .save(UrlRecord::new("https://example.com", "abc123XYZ", "u1"))
        .await
        .unwrap();

    let record = storage.find("abc123XYZ").await.unwrap();
    assert_eq!(record.original_url, "https://example.com");
    assert_eq!(record.owner_id, "u1");
    assert!(!record.is_deleted);

    assert!(matches!(
        storage.find("missing").await,
        Err(ShortenerError::NotFound)
    ));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_duplicate_url_reports_existing_alias(pool: PgPool) {
    let storage = storage(pool);

    storage
        .save(UrlRecord::new("https://dup.example", "first1234", "u1"))
        .await
        .unwrap();
    let result = storage
        .save(UrlRecord::new("https://dup.example", "second123", "u2"))
        .await;

    match result {
        Err(ShortenerError::DuplicateUrl { alias }) => assert_eq!(alias, "first1234"),
        other => panic!("expected DuplicateUrl, got {other:?}"),
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn test_duplicate_alias(pool: PgPool) {
    let storage = storage(pool);

    storage
        .save(UrlRecord::new("https://a.example", "same12345", "u1"))
        .await
        .unwrap();
    let result = storage
        .save(UrlRecord::new("https://b.example", "same12345", "u1"))
        .await;

    assert!(matches!(result, Err(ShortenerError::DuplicateAlias)));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_flush_is_all_or_nothing(pool: PgPool) {
    let storage = storage(pool.clone());

    storage
        .save(UrlRecord::new("https://taken.example", "taken1234", "u1"))
        .await
        .unwrap();

    storage
        .buffer_insert(UrlRecord::new("https://fresh.example", "fresh1234", "u1"))
        .await
        .unwrap();
    storage
        .buffer_insert(UrlRecord::new("https://taken.example", "clash1234", "u1"))
        .await
        .unwrap();

    assert!(matches!(
        storage.flush().await,
        Err(ShortenerError::BatchConflict)
    ));
    assert!(matches!(
        storage.find("fresh1234").await,
        Err(ShortenerError::NotFound)
    ));

    // The failed batch is discarded, so the next flush has nothing to write.
    storage.flush().await.unwrap();

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM urls")
        .fetch_one(storage.pool())
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_batch_repeating_url_is_conflict(pool: PgPool) {
    let storage = storage(pool);

    for alias in ["dup000001", "dup000002"] {
        storage
            .buffer_insert(UrlRecord::new("https://d.example", alias, "u1"))
            .await
            .unwrap();
    }

    assert!(matches!(
        storage.flush().await,
        Err(ShortenerError::BatchConflict)
    ));
    assert_eq!(storage.stats().await.unwrap().urls, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_soft_delete_respects_owner(pool: PgPool) {
    let storage = storage(pool);

    storage
        .save(UrlRecord::new("https://mine.example", "mine12345", "owner"))
        .await
        .unwrap();

    storage
        .buffer_delete(PendingDeletion::new("mine12345", "intruder"))
        .await
        .unwrap();
    storage.flush_deletes().await.unwrap();
    assert!(!storage.find("mine12345").await.unwrap().is_deleted);

    storage
        .buffer_delete(PendingDeletion::new("mine12345", "owner"))
        .await
        .unwrap();
    storage.flush_deletes().await.unwrap();
    assert!(storage.find("mine12345").await.unwrap().is_deleted);

    let listed = storage
        .list_by_owner("owner", "http://localhost:8080")
        .await
        .unwrap();
    assert!(listed.is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_by_owner(pool: PgPool) {
    let storage = storage(pool);

    storage
        .save(UrlRecord::new("https://one.example", "one123456", "u1"))
        .await
        .unwrap();
    storage
        .save(UrlRecord::new("https://two.example", "two123456", "u2"))
        .await
        .unwrap();

    let listed = storage
        .list_by_owner("u1", "http://localhost:8080")
        .await
        .unwrap();

    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].short_url, "http://localhost:8080/one123456");
    assert_eq!(listed[0].original_url, "https://one.example");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_users_and_stats(pool: PgPool) {
    let storage = storage(pool);

    storage.ping().await.unwrap();

    let user_id = storage.create_user().await.unwrap();
    storage.verify_user(&user_id).await.unwrap();
    assert!(matches!(
        storage
            .verify_user("00000000-0000-0000-0000-000000000000")
            .await,
        Err(ShortenerError::NotFound)
    ));

    storage
        .save(UrlRecord::new("https://stats.example", "stats1234", &user_id))
        .await
        .unwrap();

    let stats = storage.stats().await.unwrap();
    assert_eq!(stats.urls, 1);
    assert_eq!(stats.users, 1);
}
