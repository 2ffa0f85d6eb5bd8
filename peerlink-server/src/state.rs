//! Shared application state for the peerlink server

use std::sync::Arc;

use chrono::{DateTime, Utc};
use peerlink_core::SessionRegistry;

use crate::DEFAULT_PORT;
use crate::net::{HostDiscovery, SystemHostDiscovery};

/// Shared application state accessible by all handlers
#[derive(Clone)]
pub struct AppState {
    /// Registry of live signaling sessions
    pub registry: Arc<SessionRegistry>,
    /// Source of LAN addresses for host-info
    pub host_discovery: Arc<dyn HostDiscovery>,
    /// Port advertised in host-info URLs
    pub advertised_port: u16,
    /// When the server started
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Create a new AppState with an empty registry and system discovery
    pub fn new() -> Self {
        Self::with_components(
            Arc::new(SessionRegistry::new()),
            Arc::new(SystemHostDiscovery),
        )
    }

    /// Create AppState with custom components (for testing)
    pub fn with_components(
        registry: Arc<SessionRegistry>,
        host_discovery: Arc<dyn HostDiscovery>,
    ) -> Self {
        Self {
            registry,
            host_discovery,
            advertised_port: DEFAULT_PORT,
            started_at: Utc::now(),
        }
    }

    /// Set the port advertised in host-info URLs
    pub fn with_advertised_port(mut self, port: u16) -> Self {
        self.advertised_port = port;
        self
    }

    /// Returns how long the server has been running
    pub fn uptime_seconds(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("sessions", &self.registry.session_count())
            .field("advertised_port", &self.advertised_port)
            .field("started_at", &self.started_at)
            .finish()
    }
}
