#![allow(dead_code)]

use axum_test::{TestResponse, TestServer};
use std::sync::Arc;
use std::time::Duration;
use url_shortener::api::middleware::trusted::TrustedNetworks;
use url_shortener::domain::deletion_worker::{deletion_queue, run_deletion_worker};
use url_shortener::domain::repositories::Storage;
use url_shortener::infrastructure::persistence::MemoryStorage;
use url_shortener::routes::api_router;
use url_shortener::state::AppState;

pub const BASE_URL: &str = "http://localhost:8080";
pub const TRUSTED_IP: &str = "10.0.0.1";

/// Application wired to in-memory storage with a running deletion worker.
pub struct TestApp {
    pub server: TestServer,
    pub storage: Arc<MemoryStorage>,
}

pub fn spawn_app() -> TestApp {
    let storage = Arc::new(MemoryStorage::new());
    let server = server_for(storage.clone());
    TestApp { server, storage }
}

pub fn server_for(storage: Arc<dyn Storage>) -> TestServer {
    let (deletions, rx) = deletion_queue(64);
    tokio::spawn(run_deletion_worker(rx, storage.clone()));

    let state = AppState::new(
        storage,
        deletions,
        BASE_URL,
        "test-secret",
        TrustedNetworks::new([TRUSTED_IP.parse().unwrap()]),
    );

    TestServer::new(api_router(state)).unwrap()
}

/// The `token=<hex>` pair from a response's `Set-Cookie`, if one was issued.
pub fn issued_cookie(response: &TestResponse) -> Option<String> {
    response
        .headers()
        .get("set-cookie")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(str::to_string)
}

/// Makes a first request to obtain a session cookie.
pub async fn login(server: &TestServer) -> String {
    let response = server.get("/api/user/urls").await;
    issued_cookie(&response).expect("first request must issue a token")
}

pub fn alias_of(short_url: &str) -> &str {
    short_url.trim_start_matches(BASE_URL).trim_start_matches('/')
}

/// Polls `GET /{alias}` until it answers `status` or the deadline passes.
pub async fn wait_for_status(server: &TestServer, alias: &str, status: u16) -> bool {
    for _ in 0..50 {
        if server.get(&format!("/{alias}")).await.status_code() == status {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    false
}
