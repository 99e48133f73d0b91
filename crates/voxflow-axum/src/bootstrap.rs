//! Server bootstrap: bind, serve, shut down on Ctrl-C.

use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use voxflow_pipeline::PipelineConfig;

use crate::routes::create_router;
use crate::state::FacadeContext;

/// Facade server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Backend/pipeline settings applied to every request.
    pub pipeline: PipelineConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            pipeline: PipelineConfig::default(),
        }
    }
}

/// Run the facade until Ctrl-C.
///
/// # Errors
///
/// Fails if the listen address cannot be bound.
pub async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(
        listen = %addr,
        backend = %config.pipeline.backend_addr(),
        "facade listening"
    );

    let state = Arc::new(FacadeContext::new(config.pipeline));
    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown signal received");
    }
}
