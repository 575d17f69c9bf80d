//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`] which builds a full [`AppContext`] over a
//! temporary snapshot directory and starts Axum on a random port for
//! HTTP-level testing. The provider base URL can point at a wiremock server.

#![allow(dead_code)]

use std::net::SocketAddr;

use tempfile::TempDir;

use reelvault::config::Config;
use reelvault::server::{create_router, AppContext};

/// Test harness wrapping a fully-constructed [`AppContext`] backed by a
/// snapshot file in a temporary directory.
pub struct TestHarness {
    pub ctx: AppContext,
    dir: TempDir,
}

impl TestHarness {
    /// Create a new harness with default configuration and a temp snapshot.
    pub fn new() -> Self {
        Self::with_provider_url(None)
    }

    /// Create a harness whose metadata provider points at `base_url`
    /// (typically a wiremock server).
    pub fn with_provider_url(base_url: Option<&str>) -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");

        let mut config = Config::default();
        config.storage.path = dir.path().join("movies.json");
        config.provider.api_key = "test-key".to_string();
        if let Some(url) = base_url {
            config.provider.base_url = url.to_string();
        }

        let ctx = AppContext::from_config(config);
        Self { ctx, dir }
    }

    /// Path of the snapshot file backing this harness.
    pub fn snapshot_path(&self) -> std::path::PathBuf {
        self.dir.path().join("movies.json")
    }

    /// Start an Axum server on a random port and return the harness together
    /// with the bound socket address.
    pub async fn with_server() -> (Self, SocketAddr) {
        Self::spawn(Self::new()).await
    }

    /// Start a server whose provider targets the given mock base URL.
    pub async fn with_server_and_provider(base_url: &str) -> (Self, SocketAddr) {
        Self::spawn(Self::with_provider_url(Some(base_url))).await
    }

    async fn spawn(harness: Self) -> (Self, SocketAddr) {
        let app = create_router(harness.ctx.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind test listener");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("test server failed");
        });

        (harness, addr)
    }
}
