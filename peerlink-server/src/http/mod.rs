//! HTTP server module

mod api;

use std::sync::Arc;

use axum::{Router, routing::get};

use crate::AppState;
use crate::ws::session_ws;

pub use api::{HealthResponse, NotFoundResponse, RootResponse, SessionListResponse};

/// Create the HTTP router with all routes configured
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/", get(api::root))
        .route("/api/health", get(api::health))
        .route("/api/host-info", get(api::host_info))
        .route("/api/sessions", get(api::list_sessions))
        .route("/api/ws/session/:session_id", get(session_ws))
        .fallback(api::not_found)
        .with_state(state)
}
