mod common;

use axum::http::StatusCode;
use url_shortener::domain::entities::{PendingDeletion, UrlRecord};
use url_shortener::domain::repositories::UrlRepository;

#[tokio::test]
async fn test_redirect_success() {
    let app = common::spawn_app();
    app.storage
        .save(UrlRecord::new("https://example.com/target", "abc123XYZ", "u1"))
        .await
        .unwrap();

    let response = app.server.get("/abc123XYZ").await;

    response.assert_status(StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.header("location"), "https://example.com/target");
}

#[tokio::test]
async fn test_redirect_unknown_alias() {
    let app = common::spawn_app();

    app.server.get("/missing").await.assert_status_not_found();
}

#[tokio::test]
async fn test_redirect_deleted_alias_is_gone() {
    let app = common::spawn_app();
    app.storage
        .save(UrlRecord::new("https://example.com/old", "gone12345", "u1"))
        .await
        .unwrap();

    app.storage
        .buffer_delete(PendingDeletion::new("gone12345", "u1"))
        .await
        .unwrap();
    app.storage.flush_deletes().await.unwrap();

    app.server
        .get("/gone12345")
        .await
        .assert_status(StatusCode::GONE);
}
