//! Health and registry statistics endpoints.
//!
//! - `GET /health` - liveness probe
//! - `GET /api/stats` - live connection and waiting-slot counts

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};

use crate::application::{Registry, RegistrySnapshot};

/// State for the status endpoints.
#[derive(Clone)]
pub struct StatusState {
    pub registry: Arc<Registry>,
}

impl StatusState {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }
}

pub async fn health() -> &'static str {
    "ok"
}

pub async fn stats(State(state): State<StatusState>) -> Json<RegistrySnapshot> {
    Json(state.registry.snapshot().await)
}

/// Create the status router.
pub fn status_router() -> Router<StatusState> {
    Router::new()
        .route("/health", get(health))
        .route("/api/stats", get(stats))
}
