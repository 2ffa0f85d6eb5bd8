//! peerlink-server - HTTP and WebSocket server for the peerlink relay
//!
//! This crate owns the [`SessionRegistry`](peerlink_core::SessionRegistry)
//! and exposes it over a WebSocket signaling endpoint plus a small REST API
//! for health and LAN address discovery.

mod error;
pub mod http;
pub mod net;
mod state;
pub mod ws;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::http::HeaderValue;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use error::ServerError;
pub use http::create_router;
pub use net::{HostDiscovery, HostInfo, StaticHostDiscovery, SystemHostDiscovery};
pub use state::AppState;

/// Default port for the peerlink server
pub const DEFAULT_PORT: u16 = 8001;
/// Default host for the peerlink server; all interfaces so LAN peers can connect
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// The main peerlink server
pub struct PeerlinkServer {
    config: ServerConfig,
    state: Arc<AppState>,
}

impl PeerlinkServer {
    /// Create a new server with default state
    pub fn new(config: ServerConfig) -> Self {
        let state = Arc::new(AppState::new().with_advertised_port(config.port));
        Self { config, state }
    }

    /// Create a server with custom state (for testing)
    pub fn with_state(config: ServerConfig, state: Arc<AppState>) -> Self {
        Self { config, state }
    }

    /// Get the server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Get the shared application state
    pub fn state(&self) -> Arc<AppState> {
        Arc::clone(&self.state)
    }

    /// Run the server, binding to the configured address
    ///
    /// Returns after Ctrl-C once in-flight requests have finished.
    pub async fn run(self) -> Result<(), ServerError> {
        let addr = self.config.addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| ServerError::Bind {
                addr: addr.clone(),
                source: e,
            })?;

        tracing::info!("peerlink server listening on {}", addr);

        axum::serve(
            listener,
            self.router().into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ServerError::Serve)
    }

    /// Run the server on an already bound listener
    pub async fn run_with_listener(self, listener: TcpListener) -> Result<(), ServerError> {
        if let Ok(local) = listener.local_addr() {
            tracing::info!("peerlink server listening on {}", local);
        }

        axum::serve(
            listener,
            self.router().into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .map_err(ServerError::Serve)
    }

    fn router(&self) -> Router {
        create_router(Arc::clone(&self.state))
            .layer(cors_layer(&self.config.cors_origins))
            .layer(TraceLayer::new_for_http())
    }
}

/// Build the CORS layer; `*` anywhere in the list allows every origin
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origins.is_empty() || origins.iter().any(|o| o.trim() == "*") {
        return base.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin.trim()) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    base.allow_origin(AllowOrigin::list(allowed))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Origins allowed by CORS
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new(DEFAULT_HOST, DEFAULT_PORT)
    }
}

impl ServerConfig {
    /// Create a new ServerConfig with the specified host and port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            cors_origins: vec!["*".to_string()],
        }
    }

    /// Returns the socket address string (e.g., "0.0.0.0:8001")
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
