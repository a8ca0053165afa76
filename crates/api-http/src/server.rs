//! HTTP Server
//!
//! Binds the operator page and action endpoints on a local address.

use axum::routing::get;
use axum::Router;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use kabuboot_core::application::BootOrchestrator;

use crate::handler::{self, AppState};

// Localhost only: responses carry raw tool output
const DEFAULT_LISTEN: &str = "127.0.0.1:3000";

/// HTTP Server Configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpServerConfig {
    /// `host:port` to bind
    pub listen: String,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            listen: DEFAULT_LISTEN.to_string(),
        }
    }
}

/// Build the router with every route and the request trace layer
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Operator page
        .route("/", get(handler::index))
        .route("/static/index.js", get(handler::index_js))
        // Actions
        .route("/bootauthkabus", get(handler::boot_auth_kabus))
        .route("/apiauth", get(handler::api_auth))
        .route("/bootapp", get(handler::boot_app))
        // Diagnostics
        .route("/pid", get(handler::pid))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// HTTP Server
pub struct HttpServer {
    config: HttpServerConfig,
    state: AppState,
}

impl HttpServer {
    pub fn new(config: HttpServerConfig, orchestrator: Arc<BootOrchestrator>) -> Self {
        Self {
            config,
            state: AppState::new(orchestrator),
        }
    }

    /// Bind the configured address
    pub async fn bind(&self) -> Result<TcpListener, String> {
        TcpListener::bind(&self.config.listen)
            .await
            .map_err(|e| format!("Failed to bind {}: {}", self.config.listen, e))
    }

    /// Bind and serve until `shutdown` resolves
    pub async fn start<F>(self, shutdown: F) -> Result<(), String>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = self.bind().await?;
        self.serve(listener, shutdown).await
    }

    /// Serve on an already bound listener until `shutdown` resolves
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<(), String>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr: Option<SocketAddr> = listener.local_addr().ok();
        info!(addr = ?addr, "HTTP server listening (open this address in a browser)");

        axum::serve(listener, create_router(self.state))
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| format!("HTTP server error: {}", e))?;

        info!("HTTP server stopped");
        Ok(())
    }
}
