//! WebSocket adapter for chat connections.
//!
//! # Components
//!
//! - [`messages`] - JSON wire format for envelopes
//! - [`transport`] - `EnvelopeSource`/`EnvelopeSink` over an axum socket
//! - [`handler`] - Axum WebSocket upgrade handler

pub mod handler;
pub mod messages;
pub mod transport;

pub use handler::{websocket_router, ws_handler, ConnectParams, WebSocketState, WS_PATH};
pub use messages::{decode, encode, ClientMessage, ServerMessage};
pub use transport::{WebSocketSink, WebSocketSource};
