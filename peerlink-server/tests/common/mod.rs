//! Shared test utilities for peerlink-server integration tests

pub mod client;

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use peerlink_core::SessionRegistry;
use peerlink_server::{AppState, PeerlinkServer, ServerConfig, StaticHostDiscovery};
use tokio::net::TcpListener;

/// Creates a test server with default config, returns state and address
#[allow(dead_code)]
pub async fn create_test_server() -> (Arc<AppState>, SocketAddr) {
    let discovery = StaticHostDiscovery::new(vec![Ipv4Addr::new(192, 168, 1, 40)]);
    let state = Arc::new(AppState::with_components(
        Arc::new(SessionRegistry::new()),
        Arc::new(discovery),
    ));

    let server = PeerlinkServer::with_state(ServerConfig::default(), Arc::clone(&state));
    let addr = spawn_server(server).await;

    (state, addr)
}

/// Spawns server in background task, returns bound address
async fn spawn_server(server: PeerlinkServer) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let _ = server.run_with_listener(listener).await;
    });

    // Brief delay to ensure server is accepting connections
    tokio::time::sleep(std::time::Duration::from_millis(10)).await;

    addr
}

/// Poll until `check` passes or a second elapses
#[allow(dead_code)]
pub async fn eventually<F: Fn() -> bool>(check: F) -> bool {
    for _ in 0..100 {
        if check() {
            return true;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    check()
}
