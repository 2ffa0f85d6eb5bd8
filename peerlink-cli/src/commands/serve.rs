//! Peerlink serve command for running the signaling relay
//!
//! The serve command runs the peerlink server which provides:
//! - WebSocket signaling at `/api/ws/session/{session_id}`
//! - HTTP API for health, host info, and live sessions

use anyhow::Result;
use clap::Args;
use peerlink_server::{HostInfo, PeerlinkServer, SystemHostDiscovery};
use tracing::info;

use crate::config::PeerlinkConfig;

/// Arguments for the serve command
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Port to listen on (overrides config and PORT)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Host to bind to (overrides config)
    #[arg(long)]
    pub host: Option<String>,
}

impl ServeArgs {
    /// Apply command line overrides on top of the loaded config
    fn apply(&self, mut config: PeerlinkConfig) -> PeerlinkConfig {
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        config
    }
}

/// Run the serve command
pub async fn run(args: ServeArgs, config: PeerlinkConfig) -> Result<()> {
    let config = args.apply(config);
    let server_config = config.server.to_server_config();

    info!(
        "Starting peerlink server on {}:{}",
        server_config.host, server_config.port
    );
    print_reachable_urls(server_config.port);

    PeerlinkServer::new(server_config).run().await?;
    Ok(())
}

fn print_reachable_urls(port: u16) {
    let host_info = HostInfo::discover(port, &SystemHostDiscovery);
    if host_info.urls.is_empty() {
        println!("Peerlink is running on http://localhost:{}", port);
        return;
    }

    println!("Peerlink is reachable on your network at:");
    for url in &host_info.urls {
        println!("  {}", url);
    }
}
