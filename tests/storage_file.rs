mod common;

use axum::http::StatusCode;
use std::sync::Arc;
use url_shortener::infrastructure::persistence::FileStorage;

#[tokio::test]
async fn test_file_backend_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("urls.jsonl");

    let short_url = {
        let storage = Arc::new(FileStorage::open(&path).await.unwrap());
        let server = common::server_for(storage);

        let response = server.post("/").text("https://persisted.example").await;
        response.assert_status(StatusCode::CREATED);
        response.text()
    };

    let storage = Arc::new(FileStorage::open(&path).await.unwrap());
    let server = common::server_for(storage);

    let response = server
        .get(&format!("/{}", common::alias_of(&short_url)))
        .await;
    response.assert_status(StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.header("location"), "https://persisted.example");

    server
        .post("/")
        .text("https://persisted.example")
        .await
        .assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_file_backend_session_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("urls.jsonl");

    let cookie = {
        let server = common::server_for(Arc::new(FileStorage::open(&path).await.unwrap()));
        common::login(&server).await
    };

    let server = common::server_for(Arc::new(FileStorage::open(&path).await.unwrap()));
    let response = server
        .post("/")
        .add_header("Cookie", cookie)
        .text("https://again.example")
        .await;

    response.assert_status(StatusCode::CREATED);
    assert!(common::issued_cookie(&response).is_none());
}

#[tokio::test]
async fn test_file_backend_lacks_bulk_operations() {
    let dir = tempfile::tempdir().unwrap();
    let server = common::server_for(Arc::new(
        FileStorage::open(dir.path().join("urls.jsonl")).await.unwrap(),
    ));

    server
        .get("/api/user/urls")
        .await
        .assert_status(StatusCode::NOT_IMPLEMENTED);

    server
        .post("/api/shorten/batch")
        .json(&serde_json::json!([
            { "correlation_id": "1", "original_url": "https://one.example" }
        ]))
        .await
        .assert_status(StatusCode::NOT_IMPLEMENTED);
}
