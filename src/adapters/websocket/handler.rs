//! WebSocket upgrade handler for chat connections.
//!
//! Handles the HTTP → WebSocket upgrade and hands the socket to the relay:
//! 1. Resolve the `tag` query parameter (empty or absent → default tag)
//! 2. Upgrade to WebSocket
//! 3. Register, start both relay loops, attempt pairing
//! 4. Hold the upgrade task open until both loops finish

use axum::{
    extract::{ws::WebSocket, Query, State, WebSocketUpgrade},
    response::Response,
    routing::get,
    Router,
};
use serde::Deserialize;

use crate::application::RelayService;
use crate::domain::chat::Tag;

use super::transport;

/// Route the chat socket is served on.
pub const WS_PATH: &str = "/ws";

/// State required for WebSocket handling.
#[derive(Clone)]
pub struct WebSocketState {
    pub relay: RelayService,
}

impl WebSocketState {
    pub fn new(relay: RelayService) -> Self {
        Self { relay }
    }
}

/// Query parameters accepted on connect.
#[derive(Debug, Default, Deserialize)]
pub struct ConnectParams {
    /// Affinity tag; connections only pair within the same tag.
    pub tag: Option<String>,
}

/// Handle WebSocket upgrade requests.
///
/// Route: `GET /ws?tag=<tag>`
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<ConnectParams>,
    State(state): State<WebSocketState>,
) -> Response {
    let tag = state.relay.resolve_tag(params.tag.as_deref());
    ws.on_upgrade(move |socket| handle_socket(socket, tag, state))
}

async fn handle_socket(socket: WebSocket, tag: Tag, state: WebSocketState) {
    let (source, sink) = transport::split(socket);
    let session = state.relay.connect(tag, source, sink).await;
    session.join().await;
}

/// Create axum router for the chat endpoint.
pub fn websocket_router() -> Router<WebSocketState> {
    Router::new().route(WS_PATH, get(ws_handler))
}
