use std::sync::Arc;

use anyhow::Context;
use http::{HeaderValue, Method};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use url::Url;

use crate::config::{AppConfig, StorageBackend};
use crate::diagnostics;
use crate::metadata::{DynamoMetadataStore, InMemoryMetadataStore};
use crate::routes::{self, AppState};
use crate::storage::{InMemoryObjectStore, S3ObjectStore};

/// Builds both stores for the configured backend.
pub async fn build_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let state = match config.backend {
        StorageBackend::Aws => {
            let sdk_config = config.aws.sdk_config().await;
            AppState::new(
                Arc::new(S3ObjectStore::new(&sdk_config, &config.object_store)),
                Arc::new(DynamoMetadataStore::new(&sdk_config, &config.metadata_store)),
                config.max_upload_bytes,
            )
        }
        StorageBackend::Memory => {
            let bucket = config.object_store.bucket.as_deref().unwrap_or("local");
            let base_url = Url::parse(&format!("memory://{bucket}/"))
                .context("invalid bucket name for the memory backend")?;
            AppState::new(
                Arc::new(InMemoryObjectStore::new(base_url)),
                Arc::new(InMemoryMetadataStore::new()),
                config.max_upload_bytes,
            )
        }
    };

    Ok(state)
}

/// Runs the startup diagnostics, then serves until a shutdown signal arrives.
pub async fn start(config: AppConfig, state: AppState) -> anyhow::Result<()> {
    diagnostics::run(state.object_store.as_ref(), state.metadata_store.as_ref()).await;

    let origin = HeaderValue::from_str(&config.cors_origin)
        .with_context(|| format!("invalid CORS origin {:?}", config.cors_origin))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_credentials(true);

    let app = routes::router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors),
    );

    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!("Server running on http://{addr}");
    tracing::info!("Health check: http://{addr}/api/health");
    tracing::info!("Upload endpoint: http://{addr}/api/upload");
    tracing::info!("Get images: http://{addr}/api/images");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(anyhow::Error::from)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
