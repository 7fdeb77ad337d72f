//! Integration test for graceful server shutdown.

use std::sync::Arc;
use tunequiz_core::{MemorySessionStore, StaticCatalog};
use tunequiz_server::{AppState, start_server};

#[tokio::test]
async fn test_graceful_shutdown() {
    let state = AppState::new(
        Arc::new(MemorySessionStore::new()),
        Arc::new(StaticCatalog::default()),
    );

    let server_handle = start_server("127.0.0.1:0".parse().unwrap(), state)
        .await
        .expect("Failed to start server");
    let addr = server_handle.local_addr();
    assert_ne!(addr.port(), 0);

    let response = reqwest::get(format!("http://{}/health", addr))
        .await
        .expect("Server should answer");
    assert!(response.status().is_success());

    server_handle.stop().await.expect("Server stop should succeed");

    assert!(
        reqwest::get(format!("http://{}/health", addr)).await.is_err(),
        "Server should no longer accept connections"
    );
}
