// SPDX-License-Identifier: MIT
// Copyright 2026 The PixPro Authors

use pixpro::config::{Config, ServerConfig};
use pixpro::mock::{create_router, MockState};
use pixpro::navigation::HistoryNavigator;
use pixpro::notify::ToastQueue;
use pixpro::session::MemoryStorage;
use pixpro::AppContext;
use std::sync::Arc;
use std::time::Duration;

/// A mock API running on an ephemeral local port.
#[allow(dead_code)]
pub struct MockApi {
    pub state: Arc<MockState>,
    pub base_url: String,
}

/// Client wiring with inspectable notifier, navigator and storage.
#[allow(dead_code)]
pub struct TestClient {
    pub ctx: AppContext,
    pub toasts: Arc<ToastQueue>,
    pub navigator: Arc<HistoryNavigator>,
    pub storage: Arc<MemoryStorage>,
}

/// Spawn the mock API with the default test config.
#[allow(dead_code)]
pub async fn spawn_mock_api() -> MockApi {
    spawn_mock_state(MockState::new(ServerConfig::test_default())).await
}

/// Spawn the mock API with artificial latency on the auth endpoints.
#[allow(dead_code)]
pub async fn spawn_slow_mock_api(latency: Duration) -> MockApi {
    let config = ServerConfig {
        latency,
        ..ServerConfig::test_default()
    };
    spawn_mock_state(MockState::new(config)).await
}

#[allow(dead_code)]
pub async fn spawn_mock_state(state: MockState) -> MockApi {
    let state = Arc::new(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock API");
    let addr = listener.local_addr().expect("Mock API has no address");

    let app = create_router(state.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Mock API crashed");
    });

    MockApi {
        state,
        base_url: format!("http://{}", addr),
    }
}

/// Create a test app for in-process `oneshot` requests.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<MockState>) {
    let state = Arc::new(MockState::new(ServerConfig::test_default()));
    (create_router(state.clone()), state)
}

#[allow(dead_code)]
pub fn test_client(base_url: &str) -> TestClient {
    test_client_with(Config::with_base_url(base_url), Arc::new(MemoryStorage::new()))
}

#[allow(dead_code)]
pub fn test_client_with(config: Config, storage: Arc<MemoryStorage>) -> TestClient {
    let toasts = Arc::new(ToastQueue::new());
    let navigator = Arc::new(HistoryNavigator::default());

    let ctx = AppContext::new(config, storage.clone(), toasts.clone(), navigator.clone())
        .expect("Failed to build test client");

    TestClient {
        ctx,
        toasts,
        navigator,
        storage,
    }
}

/// Base URL of a port nothing listens on.
#[allow(dead_code)]
pub fn unreachable_base_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
    let port = listener.local_addr().expect("No local address").port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}
