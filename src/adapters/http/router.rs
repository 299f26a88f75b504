//! Top-level HTTP router.
//!
//! # Routes
//!
//! - `GET /ws?tag=<tag>` - chat WebSocket
//! - `GET /health`, `GET /api/stats` - status
//! - everything else - static files from the configured directory

use std::path::Path;

use axum::Router;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::adapters::websocket::{websocket_router, WebSocketState};
use crate::application::RelayService;

use super::status::{status_router, StatusState};

/// Builds the full application router.
pub fn app_router(relay: RelayService, static_dir: impl AsRef<Path>) -> Router {
    let status = StatusState::new(relay.registry().clone());

    Router::new()
        .merge(websocket_router().with_state(WebSocketState::new(relay)))
        .merge(status_router().with_state(status))
        .fallback_service(ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
}
