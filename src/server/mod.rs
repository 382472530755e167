// Recovery Coach - HTTP Server Module
// JSON API for chat, crisis analysis and SOS events

mod handlers;

pub use handlers::{
    create_router, health_check, metrics_endpoint, ApiError, ApiResponse, DEFAULT_HISTORY_LIMIT,
    MAX_HISTORY_LIMIT,
};

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::coach::Coach;
use crate::config::{Config, ServerConfig};
use crate::errors::bind_failed_error;

/// Shared state behind every request
pub struct AppServer {
    coach: Arc<Coach>,
    config: ServerConfig,
    max_message_chars: usize,
    started_at: Instant,
}

impl AppServer {
    pub fn new(coach: Coach, config: &Config) -> Self {
        Self {
            coach: Arc::new(coach),
            config: config.server.clone(),
            max_message_chars: config.chat.max_message_chars,
            started_at: Instant::now(),
        }
    }

    /// Router with tracing and CORS layers, ready to serve
    pub fn into_router(self) -> Result<axum::Router> {
        let cors = self.cors_layer()?;
        Ok(create_router(Arc::new(self))
            .layer(cors)
            .layer(TraceLayer::new_for_http()))
    }

    /// Start the HTTP server and run until Ctrl+C
    pub async fn serve(self) -> Result<()> {
        let addr: SocketAddr = self
            .config
            .bind_address
            .parse()
            .with_context(|| format!("Invalid bind address: {}", self.config.bind_address))?;

        let app = self.into_router()?;

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| anyhow::anyhow!("{}\n\n{}", e, bind_failed_error(&addr.to_string())))?;

        tracing::info!("Starting recovery coach server on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("Server error")?;

        tracing::info!("Server stopped");
        Ok(())
    }

    pub fn coach(&self) -> &Arc<Coach> {
        &self.coach
    }

    pub fn max_message_chars(&self) -> usize {
        self.max_message_chars
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    fn cors_layer(&self) -> Result<CorsLayer> {
        let origin = match &self.config.cors_origin {
            Some(origin) => AllowOrigin::exact(
                HeaderValue::from_str(origin)
                    .with_context(|| format!("Invalid CORS origin: {}", origin))?,
            ),
            None => AllowOrigin::from(Any),
        };

        Ok(CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(Any)
            .allow_headers(Any))
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
