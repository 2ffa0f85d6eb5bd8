use serde::{Deserialize, Serialize};

pub use peerlink_server::{DEFAULT_HOST, DEFAULT_PORT};

/// Default tracing level when neither RUST_LOG nor --verbose is given
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Configuration as stored in TOML files (with optional fields for merging)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawPeerlinkConfig {
    #[serde(default)]
    pub server: RawServerConfig,

    #[serde(default)]
    pub logging: RawLoggingConfig,
}

/// Server config as stored in TOML (optional fields for proper merging)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawServerConfig {
    /// Host address to bind to
    pub host: Option<String>,

    /// Port for the signaling server
    pub port: Option<u16>,

    /// Origins allowed by CORS
    pub cors_origins: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawLoggingConfig {
    pub level: Option<String>,
}

/// Final configuration with defaults applied
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct PeerlinkConfig {
    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerSection {
    /// Host address to bind to
    pub host: String,

    /// Port for the signaling server
    pub port: u16,

    /// Origins allowed by CORS; `*` allows all
    pub cors_origins: Vec<String>,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            cors_origins: vec!["*".to_string()],
        }
    }
}

impl ServerSection {
    /// Convert into the server crate's runtime config
    pub fn to_server_config(&self) -> peerlink_server::ServerConfig {
        let mut config = peerlink_server::ServerConfig::new(self.host.clone(), self.port);
        config.cors_origins = self.cors_origins.clone();
        config
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingSection {
    /// Tracing filter directive, e.g. `info` or `peerlink_core=debug`
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}
