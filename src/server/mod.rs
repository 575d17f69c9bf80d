use crate::catalog::{CatalogService, SnapshotStore};
use crate::config::Config;
use crate::metadata::{MetadataProvider, OmdbProvider};
use anyhow::{Context, Result};
use axum::{
    http::{header, Method},
    response::IntoResponse,
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod routes_catalog;

/// Shared application context
#[derive(Clone)]
pub struct AppContext {
    pub service: Arc<CatalogService>,
    pub config: Arc<Config>,
}

impl AppContext {
    /// Build a context from configuration, wiring the snapshot store and the
    /// OMDb provider into the catalog service.
    pub fn from_config(config: Config) -> Self {
        let provider: Arc<dyn MetadataProvider> = Arc::new(OmdbProvider::with_base_url(
            config.provider.api_key.clone(),
            config.provider.base_url.clone(),
        ));
        let store = SnapshotStore::new(config.storage.path.clone());
        Self {
            service: Arc::new(CatalogService::new(store, provider)),
            config: Arc::new(config),
        }
    }
}

/// Create the Axum router with all routes
pub fn create_router(ctx: AppContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(root))
        .route("/api/health", get(health_check))
        .nest("/api/collections", routes_catalog::catalog_routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

async fn root() -> impl IntoResponse {
    routes_catalog::success_with_total(
        serde_json::json!({"message": "API is running."}),
        None,
    )
}

async fn health_check() -> impl IntoResponse {
    routes_catalog::success_with_total(serde_json::json!({"status": "ok"}), None)
}

/// Start the HTTP server
pub async fn start_server(config: Config) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let ctx = AppContext::from_config(config);
    let app = create_router(ctx);

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                tracing::error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
