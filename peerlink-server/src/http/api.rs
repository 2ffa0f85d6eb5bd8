//! REST API handlers

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use peerlink_core::SessionSnapshot;
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::net::HostInfo;

/// Response for GET /api/
#[derive(Debug, Serialize, Deserialize)]
pub struct RootResponse {
    pub message: String,
}

/// GET /api/ - Liveness greeting
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Hello World".to_string(),
    })
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the server
    pub status: String,
    /// Server version
    pub version: String,
    /// Seconds since server started
    pub uptime_seconds: i64,
    /// Number of live signaling sessions
    pub active_sessions: usize,
    /// Number of joined peers across all sessions
    pub connected_peers: usize,
}

/// Health check endpoint
///
/// Returns server status, version, uptime, and session counts.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
        active_sessions: state.registry.session_count(),
        connected_peers: state.registry.member_count(),
    })
}

/// GET /api/host-info - Addresses peers on the LAN can reach the relay on
pub async fn host_info(State(state): State<Arc<AppState>>) -> Json<HostInfo> {
    Json(HostInfo::discover(
        state.advertised_port,
        state.host_discovery.as_ref(),
    ))
}

/// Response for listing sessions
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionListResponse {
    pub sessions: Vec<SessionSnapshot>,
}

/// GET /api/sessions - Live sessions and their members
pub async fn list_sessions(State(state): State<Arc<AppState>>) -> Json<SessionListResponse> {
    Json(SessionListResponse {
        sessions: state.registry.snapshot(),
    })
}

/// Body returned for unknown routes
#[derive(Debug, Serialize, Deserialize)]
pub struct NotFoundResponse {
    pub detail: String,
}

/// Fallback for unknown routes
pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(NotFoundResponse {
            detail: "Not Found".to_string(),
        }),
    )
}
